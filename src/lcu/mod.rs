// LCU module - locates the League client and tracks its gameflow phase

pub mod client;
pub mod derive;
pub mod error;
pub mod game;
pub mod identity;
pub mod locator;
pub mod poller;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use client::{endpoints, get_typed, LcuClient, LcuRequester};
pub use derive::{
  account_routing, is_target_game_mode, match_routing, normalize_puuid, platform_to_region,
  to_dashed, to_undashed,
};
pub use error::LcuError;
pub use locator::{ChainLocator, CredentialLocator, LockfileLocator, ProcessLocator};
pub use poller::{PollerConfig, PollerHandle, SessionPoller};
pub use types::{
  ConnectionCredentials, ConnectionStatus, GameData, GamePhase, InGameData, LcuEvent,
  PlayerSelection, SessionSnapshot, SummonerIdentity, ARENA_QUEUE_ID,
};
