// Finding the running League client: port + auth token

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

use super::types::ConnectionCredentials;

/// Source of credentials for the local client.
///
/// `None` means "not running right now"; callers simply retry on the next tick.
#[async_trait]
pub trait CredentialLocator: Send + Sync {
  async fn locate(&self) -> Option<ConnectionCredentials>;
}

static APP_PORT_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"--app-port=(\d+)").expect("valid app-port regex"));
static AUTH_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"--remoting-auth-token=([A-Za-z0-9_\-]+)").expect("valid auth-token regex")
});

const CLIENT_PROCESS: &str = "LeagueClientUx";
const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

/// Extract credentials from the process-listing output. Takes the first line
/// that carries both `--app-port=` and `--remoting-auth-token=`.
pub fn parse_process_listing(output: &str) -> Option<ConnectionCredentials> {
  output.lines().find_map(|line| {
    if !line.contains("--app-port=") {
      return None;
    }
    let port = APP_PORT_RE
      .captures(line)
      .and_then(|c| c[1].parse::<u16>().ok())
      .filter(|p| *p != 0)?;
    let token = AUTH_TOKEN_RE.captures(line).map(|c| c[1].to_string())?;
    Some(ConnectionCredentials::new(port, token))
  })
}

/// Parse a client lockfile: `name:pid:port:password:protocol`.
pub fn parse_lockfile(content: &str) -> Option<ConnectionCredentials> {
  let parts: Vec<&str> = content.trim().split(':').collect();
  if parts.len() < 5 {
    return None;
  }
  let port = parts[2].parse::<u16>().ok().filter(|p| *p != 0)?;
  let token = parts[3];
  if token.is_empty() {
    return None;
  }
  Some(ConnectionCredentials::new(port, token))
}

/// Reads the client's command line from the OS process table.
pub struct ProcessLocator {
  timeout: Duration,
}

impl ProcessLocator {
  pub fn new(timeout: Duration) -> Self {
    Self { timeout }
  }
}

// Candidate commands, tried in order until one yields credentials
#[cfg(target_os = "windows")]
fn listing_commands() -> Vec<Command> {
  const CREATE_NO_WINDOW: u32 = 0x08000000;

  let mut wmic = Command::new("wmic");
  wmic
    .args([
      "process",
      "where",
      &format!("name='{}.exe'", CLIENT_PROCESS),
      "get",
      "CommandLine",
      "/format:list",
    ])
    .creation_flags(CREATE_NO_WINDOW);

  // wmic is gone on recent Windows builds
  let mut powershell = Command::new("powershell");
  powershell
    .args([
      "-NoProfile",
      "-Command",
      &format!(
        "Get-CimInstance Win32_Process -Filter \"name='{}.exe'\" | Select-Object -ExpandProperty CommandLine",
        CLIENT_PROCESS
      ),
    ])
    .creation_flags(CREATE_NO_WINDOW);

  vec![wmic, powershell]
}

#[cfg(not(target_os = "windows"))]
fn listing_commands() -> Vec<Command> {
  let mut ps = Command::new("ps");
  ps.args(["-A", "-o", "args"]);
  vec![ps]
}

impl Default for ProcessLocator {
  fn default() -> Self {
    Self::new(Duration::from_secs(2))
  }
}

#[async_trait]
impl CredentialLocator for ProcessLocator {
  async fn locate(&self) -> Option<ConnectionCredentials> {
    for mut command in listing_commands() {
      command.kill_on_drop(true);
      let output = match tokio::time::timeout(self.timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
          tracing::debug!("[LCU Locator] Process listing failed: {}", e);
          continue;
        }
        Err(_) => {
          tracing::warn!("[LCU Locator] Process listing timed out after {:?}", self.timeout);
          continue;
        }
      };

      if !output.status.success() {
        tracing::debug!("[LCU Locator] Process listing exited with {}", output.status);
        continue;
      }

      let stdout = String::from_utf8_lossy(&output.stdout);
      let client_lines: String = stdout
        .lines()
        .filter(|l| l.contains(CLIENT_PROCESS))
        .collect::<Vec<_>>()
        .join("\n");
      if let Some(creds) = parse_process_listing(&client_lines) {
        tracing::info!("[LCU Locator] League client detected on port {}", creds.port);
        return Some(creds);
      }
    }

    tracing::debug!("[LCU Locator] League client process not found");
    None
  }
}

/// Reads the lockfile the client writes into its install directory.
pub struct LockfileLocator {
  search_dirs: Vec<PathBuf>,
}

impl LockfileLocator {
  pub fn new(search_dirs: Vec<PathBuf>) -> Self {
    Self { search_dirs }
  }

  /// Configured install dir first, then the usual install locations.
  pub fn with_default_dirs(league_path: Option<PathBuf>) -> Self {
    #[allow(unused_mut)]
    let mut search_dirs: Vec<PathBuf> = league_path.into_iter().collect();

    #[cfg(target_os = "windows")]
    search_dirs.extend(
      [
        r"C:\Riot Games\League of Legends",
        r"C:\Program Files\Riot Games\League of Legends",
        r"C:\Program Files (x86)\Riot Games\League of Legends",
      ]
      .iter()
      .map(PathBuf::from),
    );

    #[cfg(target_os = "macos")]
    search_dirs.push(PathBuf::from(
      "/Applications/League of Legends.app/Contents/LoL",
    ));

    Self { search_dirs }
  }
}

#[async_trait]
impl CredentialLocator for LockfileLocator {
  async fn locate(&self) -> Option<ConnectionCredentials> {
    for dir in &self.search_dirs {
      for name in LOCKFILE_NAMES {
        let path = dir.join(name);
        let content = match tokio::fs::read_to_string(&path).await {
          Ok(content) => content,
          Err(_) => continue,
        };
        match parse_lockfile(&content) {
          Some(creds) => {
            tracing::info!(
              "[LCU Locator] Found lockfile {} (port {})",
              path.display(),
              creds.port
            );
            return Some(creds);
          }
          None => tracing::warn!("[LCU Locator] Ignoring malformed lockfile {}", path.display()),
        }
      }
    }
    None
  }
}

/// Tries each locator in order; first hit wins.
pub struct ChainLocator {
  locators: Vec<Arc<dyn CredentialLocator>>,
}

impl ChainLocator {
  pub fn new(locators: Vec<Arc<dyn CredentialLocator>>) -> Self {
    Self { locators }
  }
}

#[async_trait]
impl CredentialLocator for ChainLocator {
  async fn locate(&self) -> Option<ConnectionCredentials> {
    for locator in &self.locators {
      if let Some(creds) = locator.locate().await {
        return Some(creds);
      }
    }
    None
  }
}
