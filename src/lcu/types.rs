// Types shared by the locator, client and poller

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The client only ever listens on loopback.
pub const LCU_HOST: &str = "127.0.0.1";

/// Queue id of the Arena game mode.
pub const ARENA_QUEUE_ID: i64 = 1700;

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionCredentials {
  pub port: u16,
  pub auth_token: String,
}

impl ConnectionCredentials {
  pub fn new(port: u16, auth_token: impl Into<String>) -> Self {
    Self {
      port,
      auth_token: auth_token.into(),
    }
  }

  pub fn host(&self) -> &'static str {
    LCU_HOST
  }

  pub fn base_url(&self) -> String {
    format!("https://{}:{}", LCU_HOST, self.port)
  }

  /// Value for the `Authorization` header: HTTP Basic with the fixed `riot` user.
  pub fn authorization_header(&self) -> String {
    let auth = general_purpose::STANDARD.encode(format!("riot:{}", self.auth_token));
    format!("Basic {}", auth)
  }
}

// Keep the token out of logs
impl fmt::Debug for ConnectionCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConnectionCredentials")
      .field("host", &LCU_HOST)
      .field("port", &self.port)
      .field("auth_token", &"<redacted>")
      .finish()
  }
}

/// Gameflow phase as reported by `/lol-gameflow/v1/session`.
///
/// Unknown phases are kept verbatim in `Other` so a newer client never breaks
/// change detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GamePhase {
  None,
  Lobby,
  Matchmaking,
  ReadyCheck,
  ChampSelect,
  GameStart,
  InProgress,
  Reconnect,
  WaitingForStats,
  PreEndOfGame,
  EndOfGame,
  Other(String),
}

impl GamePhase {
  pub fn as_str(&self) -> &str {
    match self {
      Self::None => "None",
      Self::Lobby => "Lobby",
      Self::Matchmaking => "Matchmaking",
      Self::ReadyCheck => "ReadyCheck",
      Self::ChampSelect => "ChampSelect",
      Self::GameStart => "GameStart",
      Self::InProgress => "InProgress",
      Self::Reconnect => "Reconnect",
      Self::WaitingForStats => "WaitingForStats",
      Self::PreEndOfGame => "PreEndOfGame",
      Self::EndOfGame => "EndOfGame",
      Self::Other(raw) => raw,
    }
  }

  /// Phases during which a game is actually being played.
  pub fn is_active_game(&self) -> bool {
    matches!(self, Self::GameStart | Self::InProgress)
  }
}

impl From<&str> for GamePhase {
  fn from(raw: &str) -> Self {
    match raw {
      "" | "None" => Self::None,
      "Lobby" => Self::Lobby,
      "Matchmaking" => Self::Matchmaking,
      "ReadyCheck" => Self::ReadyCheck,
      "ChampSelect" => Self::ChampSelect,
      "GameStart" => Self::GameStart,
      "InProgress" => Self::InProgress,
      "Reconnect" => Self::Reconnect,
      "WaitingForStats" => Self::WaitingForStats,
      "PreEndOfGame" => Self::PreEndOfGame,
      "EndOfGame" => Self::EndOfGame,
      other => Self::Other(other.to_string()),
    }
  }
}

impl From<String> for GamePhase {
  fn from(raw: String) -> Self {
    GamePhase::from(raw.as_str())
  }
}

impl From<GamePhase> for String {
  fn from(phase: GamePhase) -> Self {
    phase.as_str().to_string()
  }
}

impl fmt::Display for GamePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSelection {
  #[serde(default)]
  pub cell_id: i64,
  #[serde(default)]
  pub champion_id: i64,
  #[serde(default)]
  pub champion_name: Option<String>,
  #[serde(default)]
  pub puuid: String,
  #[serde(default)]
  pub team_id: Option<i64>,
  #[serde(default)]
  pub summoner_id: Option<u64>,
  #[serde(default)]
  pub selected_skin_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
  pub game_id: i64,
  pub queue_id: i64,
  pub map_id: i64,
  pub game_mode: Option<String>,
  pub participant_selections: Vec<PlayerSelection>,
}

/// Latest result of polling the gameflow session. Only the newest one is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub phase: GamePhase,
  pub game_data: Option<GameData>,
  pub fetched_at: DateTime<Utc>,
}

impl SessionSnapshot {
  /// Build a snapshot from the raw `/lol-gameflow/v1/session` body.
  pub fn from_gameflow(raw: GameflowSession) -> Self {
    let phase = raw
      .phase
      .as_deref()
      .map(GamePhase::from)
      .unwrap_or(GamePhase::None);

    let game_data = raw.game_data.and_then(|gd| {
      // The client sends an empty gameData object outside of games
      if gd.game_id == 0 && gd.queue.id <= 0 && gd.player_champion_selections.is_empty() {
        return None;
      }
      let map_id = if gd.queue.map_id != 0 {
        gd.queue.map_id
      } else {
        raw.map.as_ref().map(|m| m.id).unwrap_or_default()
      };
      Some(GameData {
        game_id: gd.game_id,
        queue_id: gd.queue.id,
        map_id,
        game_mode: gd.queue.game_mode.filter(|m| !m.is_empty()),
        participant_selections: gd.player_champion_selections,
      })
    });

    Self {
      phase,
      game_data,
      fetched_at: Utc::now(),
    }
  }

  pub fn queue_id(&self) -> Option<i64> {
    self.game_data.as_ref().map(|gd| gd.queue_id)
  }
}

// Wire shapes of the gameflow session. Every field is optional on the wire.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameflowSession {
  #[serde(default)]
  pub phase: Option<String>,
  #[serde(default)]
  pub game_data: Option<GameflowGameData>,
  #[serde(default)]
  pub map: Option<GameflowMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameflowGameData {
  #[serde(default)]
  pub game_id: i64,
  #[serde(default)]
  pub queue: GameflowQueue,
  #[serde(default)]
  pub player_champion_selections: Vec<PlayerSelection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameflowQueue {
  #[serde(default)]
  pub id: i64,
  #[serde(default)]
  pub map_id: i64,
  #[serde(default)]
  pub game_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameflowMap {
  #[serde(default)]
  pub id: i64,
}

/// Current player, resolved once per connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerIdentity {
  /// Always in dashed form.
  pub puuid: String,
  pub summoner_id: u64,
  pub display_name: String,
  pub level: u32,
  pub profile_icon_id: i64,
  pub region: String,
}

// Wire shape of `/lol-summoner/v1/current-summoner`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSummoner {
  #[serde(default)]
  pub puuid: String,
  #[serde(default)]
  pub summoner_id: u64,
  #[serde(default)]
  pub display_name: String,
  #[serde(default)]
  pub game_name: String,
  #[serde(default)]
  pub tag_line: String,
  #[serde(default)]
  pub internal_name: String,
  #[serde(default)]
  pub summoner_level: u32,
  #[serde(default)]
  pub profile_icon_id: i64,
}

impl CurrentSummoner {
  /// displayName, then `gameName#tagLine`, then gameName, then internalName.
  pub fn best_display_name(&self) -> String {
    if !self.display_name.is_empty() {
      return self.display_name.clone();
    }
    if !self.game_name.is_empty() && !self.tag_line.is_empty() {
      return format!("{}#{}", self.game_name, self.tag_line);
    }
    if !self.game_name.is_empty() {
      return self.game_name.clone();
    }
    if !self.internal_name.is_empty() {
      return self.internal_name.clone();
    }
    format!("Summoner{}", self.summoner_id)
  }
}

// Wire shape of `/lol-rso-auth/v1/authorization`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsoAuthorization {
  #[serde(default)]
  pub current_platform_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
  pub connected: bool,
  pub port: Option<u16>,
}

/// Events raised by the poller. Delivered to every subscriber in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LcuEvent {
  ConnectivityChanged {
    connected: bool,
  },
  PhaseChanged {
    phase: GamePhase,
    game_data: Option<GameData>,
  },
}

/// Arena view of the current game, as shown by the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InGameData {
  pub is_in_game: bool,
  pub game_mode: Option<String>,
  pub champion: Option<String>,
  pub teammate: Option<PlayerSelection>,
}
