// Logging setup: stdout plus an optional on-disk live log

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

pub const LIVE_LOG_NAME: &str = "arena-companion-live.log";

fn open_live_log(log_dir: &Path) -> Option<(File, PathBuf)> {
  // Non-fatal: stdout logging still works without the file
  if let Err(e) = fs::create_dir_all(log_dir) {
    eprintln!("[Logging] Failed to ensure logs dir exists: {}", e);
    return None;
  }

  let path = log_dir.join(LIVE_LOG_NAME);
  match File::options().create(true).append(true).open(&path) {
    Ok(file) => Some((file, path)),
    Err(e) => {
      eprintln!("[Logging] Failed to open live log {}: {}", path.display(), e);
      None
    }
  }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
/// Returns the live log path when file logging is active.
pub fn init(config: &LoggingConfig) -> Option<PathBuf> {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

  let live_log = config.log_dir.as_deref().and_then(open_live_log);
  let (file_layer, live_log_path) = match live_log {
    Some((file, path)) => (
      Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
      Some(path),
    ),
    None => (None, None),
  };

  let result = tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_target(false))
    .with(file_layer)
    .try_init();

  if let Err(e) = result {
    eprintln!("[Logging] Subscriber already installed: {}", e);
  }

  live_log_path
}
