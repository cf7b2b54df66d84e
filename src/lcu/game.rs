// Arena-specific views over a session snapshot

use serde_json::Value;

use super::derive::{is_target_game_mode, normalize_puuid};
use super::types::{
  GameData, InGameData, PlayerSelection, SessionSnapshot, SummonerIdentity, ARENA_QUEUE_ID,
};

// The client reports Arena as "CHERRY"
const ARENA_MODE_NAME: &str = "Arena";

/// Display name of the mode being played. Arena gets its public name, other
/// queues keep whatever mode the client reports.
pub fn mode_name(game_data: &GameData) -> Option<String> {
  if game_data.queue_id == ARENA_QUEUE_ID {
    return Some(ARENA_MODE_NAME.to_string());
  }
  game_data.game_mode.clone()
}

fn same_player(selection: &PlayerSelection, puuid: &str) -> bool {
  !selection.puuid.is_empty() && normalize_puuid(&selection.puuid) == normalize_puuid(puuid)
}

/// The local player's own selection.
pub fn find_player<'a>(selections: &'a [PlayerSelection], puuid: &str) -> Option<&'a PlayerSelection> {
  selections.iter().find(|s| same_player(s, puuid))
}

/// The other player on the local player's team (Arena teams are pairs).
pub fn find_teammate<'a>(
  selections: &'a [PlayerSelection],
  puuid: &str,
) -> Option<&'a PlayerSelection> {
  let me = find_player(selections, puuid)?;
  let team = me.team_id?;
  selections
    .iter()
    .find(|s| s.team_id == Some(team) && !same_player(s, puuid))
}

pub fn current_champion(selections: &[PlayerSelection], puuid: &str) -> Option<String> {
  find_player(selections, puuid).and_then(|p| p.champion_name.clone())
}

/// What the overlay shows for the current game. Not in a target game means
/// the default (all empty) value.
pub fn in_game_data(
  snapshot: Option<&SessionSnapshot>,
  identity: Option<&SummonerIdentity>,
  target_queue: i64,
) -> InGameData {
  let snapshot = match snapshot {
    Some(s) if is_target_game_mode(s.queue_id(), &s.phase, target_queue) => s,
    _ => return InGameData::default(),
  };

  let game_data = snapshot.game_data.as_ref();
  let selections = game_data
    .map(|gd| gd.participant_selections.as_slice())
    .unwrap_or_default();

  let (champion, teammate) = match identity {
    Some(me) => (
      current_champion(selections, &me.puuid),
      find_teammate(selections, &me.puuid).cloned(),
    ),
    None => (None, None),
  };

  InGameData {
    is_in_game: true,
    game_mode: game_data.and_then(mode_name),
    champion,
    teammate,
  }
}

/// Keep only games played on `queue_id`. Accepts both `{games: [...]}` and
/// the nested `{games: {games: [...]}}` shape the client returns.
pub fn filter_match_history(history: &Value, queue_id: i64) -> Vec<Value> {
  let games = history
    .get("games")
    .map(|g| g.get("games").unwrap_or(g))
    .and_then(|g| g.as_array());

  games
    .map(|games| {
      games
        .iter()
        .filter(|g| g.get("queueId").and_then(|q| q.as_i64()) == Some(queue_id))
        .cloned()
        .collect()
    })
    .unwrap_or_default()
}
