// Forwards poller events to a Tauri webview

use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};
use tokio::sync::broadcast::error::RecvError;

use crate::lcu::{GameData, LcuEvent, SessionPoller};

pub const STATUS_EVENT: &str = "lcu-status";
pub const PHASE_EVENT: &str = "lcu-phase";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasePayload<'a> {
  pub phase: &'a str,
  pub game_data: Option<&'a GameData>,
}

/// What the frontend expects on `lcu-status`.
pub fn status_payload(connected: bool) -> &'static str {
  if connected {
    "Connected"
  } else {
    "None"
  }
}

pub fn emit_event<R: Runtime>(app: &AppHandle<R>, event: &LcuEvent) {
  let result = match event {
    LcuEvent::ConnectivityChanged { connected } => {
      app.emit(STATUS_EVENT, status_payload(*connected))
    }
    LcuEvent::PhaseChanged { phase, game_data } => app.emit(
      PHASE_EVENT,
      PhasePayload {
        phase: phase.as_str(),
        game_data: game_data.as_ref(),
      },
    ),
  };

  if let Err(e) = result {
    tracing::warn!("[Bridge] Failed to emit {:?} to webview: {}", event, e);
  }
}

/// Subscribe to `poller` and re-emit every event to the webview until the
/// poller is dropped.
pub fn forward_to_webview<R: Runtime>(
  poller: &SessionPoller,
  app: AppHandle<R>,
) -> tauri::async_runtime::JoinHandle<()> {
  let mut events = poller.subscribe();
  let _ = app.emit(STATUS_EVENT, status_payload(poller.is_connected()));

  tauri::async_runtime::spawn(async move {
    loop {
      match events.recv().await {
        Ok(event) => emit_event(&app, &event),
        Err(RecvError::Lagged(missed)) => {
          tracing::warn!("[Bridge] Webview forwarder lagged, {} events skipped", missed);
        }
        Err(RecvError::Closed) => break,
      }
    }
  })
}
