// Authenticated requests against the local client API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

use super::error::LcuError;
use super::types::{ConnectionCredentials, LCU_HOST};

pub mod endpoints {
  pub const CURRENT_SUMMONER: &str = "/lol-summoner/v1/current-summoner";
  pub const GAMEFLOW_SESSION: &str = "/lol-gameflow/v1/session";
  pub const RSO_AUTHORIZATION: &str = "/lol-rso-auth/v1/authorization";
  pub const RANKED_STATS: &str = "/lol-ranked/v1/current-ranked-stats";

  /// Local match history for a player. Takes the undashed (client) puuid.
  pub fn match_history(undashed_puuid: &str, count: u32) -> String {
    format!(
      "/lol-match-history/v1/products/lol/{}/matches?begIndex=0&endIndex={}",
      undashed_puuid, count
    )
  }
}

/// Everything the poller needs from the transport. Holds the credentials;
/// the poller is the only caller that changes them.
#[async_trait]
pub trait LcuRequester: Send + Sync {
  fn credentials(&self) -> Option<ConnectionCredentials>;

  fn set_credentials(&self, credentials: ConnectionCredentials);

  fn clear_credentials(&self);

  /// Single authenticated GET, body parsed as JSON. Never retried.
  async fn get_json(&self, endpoint: &str) -> Result<Value, LcuError>;
}

/// `get_json` followed by deserialisation into `T`.
pub async fn get_typed<T: DeserializeOwned>(
  requester: &dyn LcuRequester,
  endpoint: &str,
) -> Result<T, LcuError> {
  let value = requester.get_json(endpoint).await?;
  serde_json::from_value(value).map_err(|e| LcuError::malformed(endpoint, e))
}

/// reqwest-backed client for the loopback API.
///
/// The inner `reqwest::Client` is private to this type and only ever sends to
/// `https://127.0.0.1:<port>`, so accepting the client's self-signed certificate
/// does not leak into any other HTTP traffic in the process.
pub struct LcuClient {
  http: reqwest::Client,
  credentials: RwLock<Option<ConnectionCredentials>>,
}

impl LcuClient {
  pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self, LcuError> {
    let http = reqwest::Client::builder()
      .danger_accept_invalid_certs(true)
      .no_proxy()
      .timeout(request_timeout)
      .connect_timeout(connect_timeout)
      .pool_max_idle_per_host(2)
      .build()
      .map_err(LcuError::ClientBuild)?;

    Ok(Self {
      http,
      credentials: RwLock::new(None),
    })
  }

  /// Resolve `endpoint` against the loopback base URL, refusing anything that
  /// would leave 127.0.0.1.
  pub fn endpoint_url(credentials: &ConnectionCredentials, endpoint: &str) -> Result<Url, LcuError> {
    if !endpoint.starts_with('/') || endpoint.starts_with("//") {
      return Err(LcuError::InvalidEndpoint(endpoint.to_string()));
    }
    let base = Url::parse(&credentials.base_url())
      .map_err(|_| LcuError::InvalidEndpoint(endpoint.to_string()))?;
    let url = base
      .join(endpoint)
      .map_err(|_| LcuError::InvalidEndpoint(endpoint.to_string()))?;

    if url.host_str() != Some(LCU_HOST) || url.port_or_known_default() != Some(credentials.port) {
      return Err(LcuError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url)
  }
}

#[async_trait]
impl LcuRequester for LcuClient {
  fn credentials(&self) -> Option<ConnectionCredentials> {
    self
      .credentials
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .clone()
  }

  fn set_credentials(&self, credentials: ConnectionCredentials) {
    *self.credentials.write().unwrap_or_else(|e| e.into_inner()) = Some(credentials);
  }

  fn clear_credentials(&self) {
    *self.credentials.write().unwrap_or_else(|e| e.into_inner()) = None;
  }

  async fn get_json(&self, endpoint: &str) -> Result<Value, LcuError> {
    let credentials = self.credentials().ok_or(LcuError::NotConnected)?;
    let url = Self::endpoint_url(&credentials, endpoint)?;

    let response = self
      .http
      .get(url)
      .header("Authorization", credentials.authorization_header())
      .header("Accept", "application/json")
      .send()
      .await
      .map_err(LcuError::unreachable)?;

    let status = response.status();
    if !status.is_success() {
      tracing::debug!("[LCU Client] {} -> {}", endpoint, status);
      return Err(LcuError::from_status(endpoint, status));
    }

    let body = response.bytes().await.map_err(LcuError::unreachable)?;
    if body.is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| LcuError::malformed(endpoint, e))
  }
}
