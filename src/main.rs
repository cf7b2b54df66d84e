use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

use arena_companion_lib::config::AppConfig;
use arena_companion_lib::lcu::LcuEvent;
use arena_companion_lib::{build_poller, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config_path = AppConfig::resolve_path(std::env::args_os().nth(1).map(PathBuf::from));
  let file = AppConfig::read(&config_path)?;

  // Logging first, so validation warnings are not lost
  let logging_config = file.as_ref().map(|c| c.logging.clone()).unwrap_or_default();
  let live_log = logging::init(&logging_config);
  let config = AppConfig::from_file(&config_path, file)?;
  if let Some(path) = live_log {
    tracing::info!("Writing live log to {}", path.display());
  }

  let poller = build_poller(&config)?;
  let mut events = poller.subscribe();
  let handle = poller.start();

  let shutdown = tokio::signal::ctrl_c();
  tokio::pin!(shutdown);

  loop {
    tokio::select! {
      _ = &mut shutdown => {
        tracing::info!("Shutting down");
        break;
      }
      event = events.recv() => match event {
        Ok(LcuEvent::ConnectivityChanged { connected }) => {
          let status = poller.connection_status();
          tracing::info!(
            "lcu-status: {} (port {:?})",
            if connected { "Connected" } else { "None" },
            status.port
          );
          if let Some(me) = poller.summoner() {
            tracing::info!("Summoner {} on {}", me.display_name, me.region);
          }
        }
        Ok(LcuEvent::PhaseChanged { phase, game_data }) => {
          tracing::info!(
            "lcu-phase: {} (queue {:?})",
            phase,
            game_data.as_ref().map(|gd| gd.queue_id)
          );
          if poller.is_in_target_game() {
            let data = poller.in_game_data();
            tracing::info!(
              "Arena game: champion {:?}, teammate {:?}",
              data.champion,
              data.teammate.and_then(|t| t.champion_name)
            );
          }
        }
        Err(RecvError::Lagged(missed)) => {
          tracing::warn!("Event stream lagged, {} events skipped", missed);
        }
        Err(RecvError::Closed) => break,
      },
    }
  }

  handle.shutdown().await;
  Ok(())
}
