use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lcu::{PollerConfig, ARENA_QUEUE_ID};

// Configuration loaded from config.json in the app data directory

pub const CONFIG_ENV_VAR: &str = "ARENA_COMPANION_CONFIG";
const APP_DIR_NAME: &str = "com.arena-companion.app";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error("Invalid config: {0}")]
  Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Default filter when RUST_LOG is not set.
  pub level: String,
  /// Directory for the live log file; no file logging when unset.
  pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      log_dir: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub poll_interval_ms: u64,
  pub request_timeout_ms: u64,
  pub connect_timeout_ms: u64,
  pub target_queue_id: i64,
  /// League install dir, searched for the client lockfile.
  pub league_path: Option<PathBuf>,
  pub logging: LoggingConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms: 5000,
      request_timeout_ms: 3000,
      connect_timeout_ms: 1500,
      target_queue_id: ARENA_QUEUE_ID,
      league_path: None,
      logging: LoggingConfig::default(),
    }
  }
}

/// `%APPDATA%/<app>` on Windows, `$XDG_CONFIG_HOME/<app>` or `~/.config/<app>`
/// elsewhere, `./<app>` as a last resort.
pub fn app_data_dir() -> PathBuf {
  let base = std::env::var_os("APPDATA")
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from))
    .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    .unwrap_or_else(|| PathBuf::from("."));
  base.join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
  app_data_dir().join("config").join("config.json")
}

impl AppConfig {
  /// Load from `path`. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let file = Self::read(path)?;
    Self::from_file(path, file)
  }

  /// Parse `path` as-is, without validating or logging. `None` when the file
  /// does not exist. Lets the caller set up logging from the file first.
  pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
    if !path.exists() {
      return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Some(config))
  }

  /// Validate what [`AppConfig::read`] returned for `path`.
  pub fn from_file(path: &Path, file: Option<Self>) -> Result<Self, ConfigError> {
    match file {
      Some(config) => {
        tracing::info!("Loaded config from {}", path.display());
        config.validated()
      }
      None => {
        tracing::info!("Config file {} not found, using defaults", path.display());
        Self::default().validated()
      }
    }
  }

  /// Resolve the config path: explicit argument, then the env var, then the app data dir.
  pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
      .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
      .unwrap_or_else(default_config_path)
  }

  /// Reject unusable values and clamp timeouts below the poll interval, so a
  /// hung request can never hold up the next tick.
  pub fn validated(mut self) -> Result<Self, ConfigError> {
    if self.poll_interval_ms == 0 {
      return Err(ConfigError::Invalid("poll_interval_ms must be greater than 0".into()));
    }

    let max_timeout = (self.poll_interval_ms / 4 * 3).max(1);
    if self.request_timeout_ms == 0 || self.request_timeout_ms >= self.poll_interval_ms {
      tracing::warn!(
        "request_timeout_ms {} must be below poll_interval_ms {}, using {}",
        self.request_timeout_ms,
        self.poll_interval_ms,
        max_timeout
      );
      self.request_timeout_ms = max_timeout;
    }
    if self.connect_timeout_ms == 0 || self.connect_timeout_ms > self.request_timeout_ms {
      self.connect_timeout_ms = self.request_timeout_ms;
    }

    Ok(self)
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  pub fn connect_timeout(&self) -> Duration {
    Duration::from_millis(self.connect_timeout_ms)
  }

  pub fn poller_config(&self) -> PollerConfig {
    PollerConfig {
      poll_interval: self.poll_interval(),
      target_queue_id: self.target_queue_id,
      ..PollerConfig::default()
    }
  }
}
