//! Headless core of the Arena companion: finds the running League client,
//! polls its gameflow session and raises connectivity and phase events.

pub mod config;
pub mod lcu;
pub mod logging;

#[cfg(feature = "tauri")]
pub mod bridge;

use std::sync::Arc;

use config::AppConfig;
use lcu::{
  ChainLocator, CredentialLocator, LcuClient, LcuError, LockfileLocator, ProcessLocator,
  SessionPoller,
};

/// Wire up the production poller from config: process-table locator first,
/// lockfile second, reqwest client for the loopback API.
pub fn build_poller(config: &AppConfig) -> Result<SessionPoller, LcuError> {
  let client = LcuClient::new(config.request_timeout(), config.connect_timeout())?;

  let locators: Vec<Arc<dyn CredentialLocator>> = vec![
    Arc::new(ProcessLocator::new(config.request_timeout())),
    Arc::new(LockfileLocator::with_default_dirs(config.league_path.clone())),
  ];

  Ok(SessionPoller::new(
    Arc::new(client),
    Arc::new(ChainLocator::new(locators)),
    config.poller_config(),
  ))
}
