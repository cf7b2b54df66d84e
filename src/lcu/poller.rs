// Session poller: fixed-interval connectivity and gameflow-phase tracking

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::client::{endpoints, get_typed, LcuRequester};
use super::derive::{is_target_game_mode, to_undashed};
use super::error::LcuError;
use super::game;
use super::identity::resolve_identity;
use super::locator::CredentialLocator;
use super::types::{
  ConnectionStatus, GamePhase, GameflowSession, InGameData, LcuEvent, SessionSnapshot,
  SummonerIdentity, ARENA_QUEUE_ID,
};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct PollerConfig {
  pub poll_interval: Duration,
  /// Queue treated as "the" game mode (Arena by default).
  pub target_queue_id: i64,
  /// Per-subscriber event backlog before the oldest events are dropped.
  pub event_capacity: usize,
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self {
      poll_interval: Duration::from_secs(5),
      target_queue_id: ARENA_QUEUE_ID,
      event_capacity: 64,
    }
  }
}

#[derive(Debug, Default)]
struct PollerState {
  connected: bool,
  /// Last phase handed to subscribers in this connection epoch.
  announced_phase: Option<GamePhase>,
  snapshot: Option<SessionSnapshot>,
  identity: Option<SummonerIdentity>,
  region: Option<String>,
}

struct Inner {
  requester: Arc<dyn LcuRequester>,
  locator: Arc<dyn CredentialLocator>,
  config: PollerConfig,
  state: RwLock<PollerState>,
  events: broadcast::Sender<LcuEvent>,
  tick_in_flight: AtomicBool,
  stop: CancellationToken,
}

/// Polls the local client and raises [`LcuEvent`]s.
///
/// Cheap to clone; clones share state. All state changes happen inside
/// [`SessionPoller::tick`], callers only read through the accessors.
#[derive(Clone)]
pub struct SessionPoller {
  inner: Arc<Inner>,
}

/// Returned by [`SessionPoller::start`].
pub struct PollerHandle {
  stop: CancellationToken,
  task: JoinHandle<()>,
}

impl PollerHandle {
  /// No further ticks are scheduled after this returns. A tick already
  /// running completes, but its events and state changes are dropped.
  pub fn stop(&self) {
    self.stop.cancel();
  }

  pub fn is_stopped(&self) -> bool {
    self.stop.is_cancelled()
  }

  /// Stop and wait for the polling task to exit.
  pub async fn shutdown(self) {
    self.stop.cancel();
    if let Err(e) = self.task.await {
      tracing::warn!("[LCU Poller] Polling task ended abnormally: {}", e);
    }
  }
}

// Clears the in-flight flag even if the tick future is dropped midway
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

impl SessionPoller {
  pub fn new(
    requester: Arc<dyn LcuRequester>,
    locator: Arc<dyn CredentialLocator>,
    config: PollerConfig,
  ) -> Self {
    let (events, _) = broadcast::channel(config.event_capacity.max(1));
    Self {
      inner: Arc::new(Inner {
        requester,
        locator,
        config,
        state: RwLock::new(PollerState::default()),
        events,
        tick_in_flight: AtomicBool::new(false),
        stop: CancellationToken::new(),
      }),
    }
  }

  /// New event stream. Drop the receiver to unsubscribe.
  pub fn subscribe(&self) -> broadcast::Receiver<LcuEvent> {
    self.inner.events.subscribe()
  }

  pub fn config(&self) -> &PollerConfig {
    &self.inner.config
  }

  /// Spawn the polling loop on the current Tokio runtime. The first tick runs
  /// immediately. Stopping is final: build a new poller to poll again.
  pub fn start(&self) -> PollerHandle {
    let poller = self.clone();
    let stop = self.inner.stop.clone();
    // tokio's interval panics on a zero period
    let period = self.inner.config.poll_interval.max(MIN_POLL_INTERVAL);

    tracing::info!("[LCU Poller] Starting with interval {:?}", period);

    let task = tokio::spawn(async move {
      let mut interval = tokio::time::interval(period);
      // A tick that overruns the period swallows the ticks it overlapped
      interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

      loop {
        tokio::select! {
          _ = poller.inner.stop.cancelled() => break,
          _ = interval.tick() => {}
        }
        poller.tick().await;
      }

      tracing::info!("[LCU Poller] Stopped");
    });

    PollerHandle { stop, task }
  }

  /// One poll cycle. Never fails: every error is logged and folded into state.
  ///
  /// A call made while another tick is still running is dropped.
  pub async fn tick(&self) {
    if self.inner.tick_in_flight.swap(true, Ordering::AcqRel) {
      tracing::debug!("[LCU Poller] Previous tick still running, skipping");
      return;
    }
    let _guard = InFlightGuard(&self.inner.tick_in_flight);

    let requester = self.inner.requester.as_ref();

    // 1) Credentials
    if requester.credentials().is_none() {
      match self.inner.locator.locate().await {
        Some(credentials) => requester.set_credentials(credentials),
        None => return,
      }
    }

    // 2) Liveness. The body doubles as the identity source.
    let summoner = match requester.get_json(endpoints::CURRENT_SUMMONER).await {
      Ok(summoner) => summoner,
      Err(e) => {
        tracing::debug!("[LCU Poller] Liveness check failed: {}", e);
        self.handle_connection_error(&e);
        return;
      }
    };

    // 3) Connected edge and identity
    let newly_connected = {
      let Some(mut state) = self.live_state() else {
        return;
      };
      let edge = !state.connected;
      if edge {
        state.connected = true;
        state.announced_phase = None;
        tracing::info!("[LCU Poller] League client connected");
        self.emit(LcuEvent::ConnectivityChanged { connected: true });
      }
      edge
    };
    let needs_identity = newly_connected || self.read_state().identity.is_none();
    if needs_identity {
      self.refresh_identity(summoner).await;
    }

    // 4) Session snapshot
    let session = match get_typed::<GameflowSession>(requester, endpoints::GAMEFLOW_SESSION).await {
      Ok(session) => session,
      Err(e) if e.is_connection_loss() => {
        tracing::warn!("[LCU Poller] Lost client while fetching session: {}", e);
        self.handle_connection_error(&e);
        return;
      }
      Err(e) => {
        tracing::debug!("[LCU Poller] No session data this tick: {}", e);
        return;
      }
    };

    let snapshot = SessionSnapshot::from_gameflow(session);
    let Some(mut state) = self.live_state() else {
      return;
    };
    if !state.connected {
      return;
    }
    if state.announced_phase.as_ref() != Some(&snapshot.phase) {
      tracing::info!(
        "[LCU Poller] Phase changed: {} -> {}",
        state
          .announced_phase
          .as_ref()
          .map(GamePhase::as_str)
          .unwrap_or("<none>"),
        snapshot.phase
      );
      state.announced_phase = Some(snapshot.phase.clone());
      self.emit(LcuEvent::PhaseChanged {
        phase: snapshot.phase.clone(),
        game_data: snapshot.game_data.clone(),
      });
    }
    state.snapshot = Some(snapshot);
  }

  /// Locate the client right away instead of waiting for the next tick.
  /// Returns whether credentials are now held.
  ///
  /// Different credentials mean a different client process: the current
  /// connection ends here and the next tick starts a new one.
  pub async fn refresh_client_detection(&self) -> bool {
    let Some(credentials) = self.inner.locator.locate().await else {
      return self.inner.requester.credentials().is_some();
    };

    let held = self.inner.requester.credentials();
    if held.as_ref() != Some(&credentials) {
      if held.is_some() {
        tracing::info!(
          "[LCU Poller] Client process changed, now on port {}",
          credentials.port
        );
      }
      self.end_connection("client process changed");
    }
    self.inner.requester.set_credentials(credentials);
    true
  }

  pub fn connection_status(&self) -> ConnectionStatus {
    let connected = self.read_state().connected;
    ConnectionStatus {
      connected,
      port: self.inner.requester.credentials().map(|c| c.port),
    }
  }

  pub fn is_connected(&self) -> bool {
    self.read_state().connected
  }

  pub fn current_phase(&self) -> Option<GamePhase> {
    self.read_state().announced_phase.clone()
  }

  pub fn latest_snapshot(&self) -> Option<SessionSnapshot> {
    self.read_state().snapshot.clone()
  }

  pub fn summoner(&self) -> Option<SummonerIdentity> {
    self.read_state().identity.clone()
  }

  pub fn region(&self) -> Option<String> {
    self.read_state().region.clone()
  }

  /// Whether the latest snapshot is an active game on the target queue.
  pub fn is_in_target_game(&self) -> bool {
    let state = self.read_state();
    state.snapshot.as_ref().is_some_and(|s| {
      is_target_game_mode(s.queue_id(), &s.phase, self.inner.config.target_queue_id)
    })
  }

  /// Arena overlay data from the latest snapshot. No I/O.
  pub fn in_game_data(&self) -> InGameData {
    let state = self.read_state();
    game::in_game_data(
      state.snapshot.as_ref(),
      state.identity.as_ref(),
      self.inner.config.target_queue_id,
    )
  }

  /// Recent games on the target queue from the client's local match history.
  pub async fn fetch_arena_match_history(&self, count: u32) -> Result<Vec<Value>, LcuError> {
    let puuid = self.summoner().ok_or(LcuError::NotConnected)?.puuid;
    // The local client wants the undashed form
    let endpoint = endpoints::match_history(&to_undashed(&puuid), count);
    let history = self.inner.requester.get_json(&endpoint).await?;
    Ok(game::filter_match_history(&history, self.inner.config.target_queue_id))
  }

  /// Per-champion entries of the current ranked stats.
  pub async fn fetch_ranked_stats(&self) -> Result<Vec<Value>, LcuError> {
    let stats = self.inner.requester.get_json(endpoints::RANKED_STATS).await?;
    Ok(
      stats
        .get("champions")
        .and_then(|c| c.as_array())
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn refresh_identity(&self, summoner: Value) {
    let known_region = self.read_state().region.clone();
    match resolve_identity(self.inner.requester.as_ref(), summoner, known_region).await {
      Ok(identity) => {
        let Some(mut state) = self.live_state() else {
          return;
        };
        if !state.connected {
          return;
        }
        tracing::info!(
          "[LCU Poller] Logged in as {} (level {}, region {})",
          identity.display_name,
          identity.level,
          identity.region
        );
        state.region.get_or_insert_with(|| identity.region.clone());
        state.identity = Some(identity);
      }
      Err(e) => tracing::warn!("[LCU Poller] Could not resolve summoner identity: {}", e),
    }
  }

  fn handle_connection_error(&self, error: &LcuError) {
    if self.inner.stop.is_cancelled() {
      return;
    }
    if error.is_connection_loss() {
      self.inner.requester.clear_credentials();
    }
    self.end_connection(error);
  }

  /// Forget everything tied to the current client process.
  fn end_connection(&self, reason: impl std::fmt::Display) {
    let Some(mut state) = self.live_state() else {
      return;
    };
    let was_connected = state.connected;
    state.connected = false;
    state.announced_phase = None;
    state.snapshot = None;
    state.identity = None;
    state.region = None;

    if was_connected {
      tracing::info!("[LCU Poller] League client disconnected: {}", reason);
      self.emit(LcuEvent::ConnectivityChanged { connected: false });
    }
  }

  fn emit(&self, event: LcuEvent) {
    if self.inner.stop.is_cancelled() {
      tracing::debug!("[LCU Poller] Dropping event after stop: {:?}", event);
      return;
    }
    // Err only means nobody is subscribed
    let _ = self.inner.events.send(event);
  }

  // Write access for tick results. None once stopped: a tick still in flight
  // at stop must not change what the accessors report.
  fn live_state(&self) -> Option<RwLockWriteGuard<'_, PollerState>> {
    let state = self.write_state();
    if self.inner.stop.is_cancelled() {
      tracing::debug!("[LCU Poller] Discarding tick results after stop");
      return None;
    }
    Some(state)
  }

  fn read_state(&self) -> RwLockReadGuard<'_, PollerState> {
    self.inner.state.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write_state(&self) -> RwLockWriteGuard<'_, PollerState> {
    self.inner.state.write().unwrap_or_else(|e| e.into_inner())
  }
}
