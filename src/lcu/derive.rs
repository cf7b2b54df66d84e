// Pure mappings from raw client values to domain values. No I/O here.

use super::types::GamePhase;

/// Map a client platform id (`EUW1`, `NA1`, ...) to the region code used by the
/// public APIs. Unknown ids pass through lower-cased; the result is never empty.
pub fn platform_to_region(platform_id: &str) -> String {
  let platform = platform_id.trim();
  let region = match platform.to_ascii_uppercase().as_str() {
    "NA1" | "NA" => "na1",
    "EUW1" | "EUW" => "euw1",
    "EUN1" | "EUNE1" | "EUNE" => "eun1",
    "KR" => "kr",
    "JP1" => "jp1",
    "BR1" => "br1",
    "LA1" => "la1",
    "LA2" => "la2",
    "OC1" => "oc1",
    "TR1" => "tr1",
    "RU" => "ru",
    "PH2" => "ph2",
    "SG2" => "sg2",
    "TH2" => "th2",
    "TW2" => "tw2",
    "VN2" => "vn2",
    "" => "unknown",
    _ => return platform.to_lowercase(),
  };
  region.to_string()
}

/// Regional routing value for account lookups.
pub fn account_routing(region: &str) -> &'static str {
  match region {
    "br1" | "la1" | "la2" | "na1" | "oc1" => "americas",
    "eun1" | "euw1" | "tr1" | "ru" => "europe",
    "jp1" | "kr" => "asia",
    "ph2" | "sg2" | "th2" | "tw2" | "vn2" => "sea",
    _ => "americas",
  }
}

/// Regional routing value for match history lookups. Differs from
/// [`account_routing`] only for OCE, whose matches live in `sea`.
pub fn match_routing(region: &str) -> &'static str {
  match region {
    "oc1" => "sea",
    other => account_routing(other),
  }
}

const DASH_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

fn is_undashed_puuid(puuid: &str) -> bool {
  puuid.len() == 32 && puuid.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_dashed_puuid(puuid: &str) -> bool {
  let groups: Vec<&str> = puuid.split('-').collect();
  groups.len() == DASH_GROUPS.len()
    && groups
      .iter()
      .zip(DASH_GROUPS)
      .all(|(g, len)| g.len() == len && g.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Convert an undashed 32-hex puuid to the `8-4-4-4-12` form used by external APIs.
/// Anything that is not a valid undashed puuid is returned unchanged.
pub fn to_dashed(puuid: &str) -> String {
  if !is_undashed_puuid(puuid) {
    return puuid.to_string();
  }
  let mut out = String::with_capacity(36);
  let mut start = 0;
  for (i, len) in DASH_GROUPS.iter().enumerate() {
    if i > 0 {
      out.push('-');
    }
    out.push_str(&puuid[start..start + len]);
    start += len;
  }
  out
}

/// Convert a dashed puuid to the undashed form used against the local client.
/// Anything that is not a valid dashed puuid is returned unchanged.
pub fn to_undashed(puuid: &str) -> String {
  if !is_dashed_puuid(puuid) {
    return puuid.to_string();
  }
  puuid.replace('-', "")
}

/// Normalise either encoding to the dashed one, for comparisons and external calls.
pub fn normalize_puuid(puuid: &str) -> String {
  if is_undashed_puuid(puuid) {
    to_dashed(puuid)
  } else {
    puuid.to_string()
  }
}

/// True iff the game is on `target_queue` and actually being played.
/// Gates mode-specific behaviour such as voice auto-join.
pub fn is_target_game_mode(queue_id: Option<i64>, phase: &GamePhase, target_queue: i64) -> bool {
  queue_id == Some(target_queue) && phase.is_active_game()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lcu::types::ARENA_QUEUE_ID;
  use proptest::prelude::*;

  const DASHED: &str = "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d";
  const UNDASHED: &str = "0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d";

  #[test]
  fn known_platforms_map_to_regions() {
    assert_eq!(platform_to_region("EUW1"), "euw1");
    assert_eq!(platform_to_region("EUNE1"), "eun1");
    assert_eq!(platform_to_region("NA1"), "na1");
    assert_eq!(platform_to_region("kr"), "kr");
  }

  #[test]
  fn unknown_platforms_pass_through_lowercased() {
    assert_eq!(platform_to_region("ME1"), "me1");
    assert_eq!(platform_to_region("  PBE1 "), "pbe1");
    assert_eq!(platform_to_region(""), "unknown");
  }

  #[test]
  fn routing_tables() {
    assert_eq!(account_routing("euw1"), "europe");
    assert_eq!(account_routing("oc1"), "americas");
    assert_eq!(match_routing("oc1"), "sea");
    assert_eq!(match_routing("kr"), "asia");
    assert_eq!(match_routing("nowhere"), "americas");
  }

  #[test]
  fn puuid_conversions() {
    assert_eq!(to_dashed(UNDASHED), DASHED);
    assert_eq!(to_undashed(DASHED), UNDASHED);
    assert_eq!(normalize_puuid(UNDASHED), DASHED);
    assert_eq!(normalize_puuid(DASHED), DASHED);
  }

  #[test]
  fn malformed_puuids_are_returned_unchanged() {
    for bad in ["", "abc", "zz1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d", "0a1b2c3d-4e5f-6a7b-8c9d0e1f2a3b4c5d"] {
      assert_eq!(to_dashed(bad), bad);
      assert_eq!(to_undashed(bad), bad);
    }
    // Already dashed input is not re-dashed
    assert_eq!(to_dashed(DASHED), DASHED);
  }

  #[test]
  fn target_game_mode_requires_queue_and_active_phase() {
    assert!(is_target_game_mode(Some(ARENA_QUEUE_ID), &GamePhase::InProgress, ARENA_QUEUE_ID));
    assert!(is_target_game_mode(Some(ARENA_QUEUE_ID), &GamePhase::GameStart, ARENA_QUEUE_ID));
    assert!(!is_target_game_mode(Some(ARENA_QUEUE_ID), &GamePhase::ChampSelect, ARENA_QUEUE_ID));
    assert!(!is_target_game_mode(Some(420), &GamePhase::InProgress, ARENA_QUEUE_ID));
    assert!(!is_target_game_mode(None, &GamePhase::InProgress, ARENA_QUEUE_ID));
  }

  proptest! {
    #[test]
    fn puuid_round_trip(raw in "[0-9a-f]{32}") {
      let dashed = to_dashed(&raw);
      prop_assert_eq!(to_undashed(&dashed), raw.clone());
      prop_assert_eq!(to_dashed(&to_undashed(&dashed)), dashed);
    }

    #[test]
    fn region_is_never_empty(platform in "\\PC{0,12}") {
      prop_assert!(!platform_to_region(&platform).is_empty());
    }
  }
}
