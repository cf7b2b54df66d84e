// One-shot resolution of the logged-in player and their region

use serde::Deserialize;
use serde_json::Value;

use super::client::{endpoints, get_typed, LcuRequester};
use super::derive::{normalize_puuid, platform_to_region};
use super::error::LcuError;
use super::types::{CurrentSummoner, RsoAuthorization, SummonerIdentity};

const REGION_LOCALE: &str = "/riotclient/region-locale";

#[derive(Debug, Default, Deserialize)]
struct RegionLocale {
  #[serde(default)]
  region: String,
}

/// Ask the client which platform it is logged into. Prefers the RSO
/// authorization's platform id, falls back to the riotclient region.
pub async fn resolve_region(requester: &dyn LcuRequester) -> Result<String, LcuError> {
  match get_typed::<RsoAuthorization>(requester, endpoints::RSO_AUTHORIZATION).await {
    Ok(auth) if !auth.current_platform_id.is_empty() => {
      return Ok(platform_to_region(&auth.current_platform_id));
    }
    Ok(_) => tracing::debug!("[LCU Identity] Authorization carried no platform id"),
    Err(e) if e.is_connection_loss() => return Err(e),
    Err(e) => tracing::debug!("[LCU Identity] Authorization lookup failed: {}", e),
  }

  let locale: RegionLocale = get_typed(requester, REGION_LOCALE).await?;
  if locale.region.is_empty() {
    return Err(LcuError::malformed(REGION_LOCALE, "missing region"));
  }
  Ok(platform_to_region(&locale.region))
}

/// Build the identity from a current-summoner body and tag it with a region.
///
/// `summoner` is the body the liveness check already fetched. `known_region` is
/// the region already derived for this connection; when set it is reused as-is,
/// since region never changes within a connection.
pub async fn resolve_identity(
  requester: &dyn LcuRequester,
  summoner: Value,
  known_region: Option<String>,
) -> Result<SummonerIdentity, LcuError> {
  let summoner: CurrentSummoner = serde_json::from_value(summoner)
    .map_err(|e| LcuError::malformed(endpoints::CURRENT_SUMMONER, e))?;
  if summoner.puuid.is_empty() {
    return Err(LcuError::malformed(endpoints::CURRENT_SUMMONER, "missing puuid"));
  }

  let region = match known_region {
    Some(region) => region,
    None => resolve_region(requester).await?,
  };

  Ok(SummonerIdentity {
    puuid: normalize_puuid(&summoner.puuid),
    summoner_id: summoner.summoner_id,
    display_name: summoner.best_display_name(),
    level: summoner.summoner_level,
    profile_icon_id: summoner.profile_icon_id,
    region,
  })
}
