// End-to-end poll scenarios: client absent, first connect, connection loss, phase sequence

use super::test_helpers::*;
use crate::lcu::client::{endpoints, LcuRequester};
use crate::lcu::types::{GamePhase, LcuEvent};
use std::sync::Arc;

#[cfg(test)]
mod scenario_tests {
    use super::*;

    /// Scenario: No client process is running.
    /// Expected: The poller stays disconnected across many ticks and emits nothing.
    #[tokio::test]
    async fn test_no_client_stays_disconnected_silently() {
        let requester = Arc::new(healthy_requester("None"));
        let locator = Arc::new(ScriptedLocator::always(None));
        let poller = make_poller(requester.clone(), locator.clone());
        let mut rx = poller.subscribe();

        for _ in 0..10 {
            poller.tick().await;
        }

        assert!(drain(&mut rx).is_empty());
        assert!(!poller.is_connected());
        assert_eq!(locator.calls(), 10);
        // Nothing reached the client without credentials
        assert_eq!(requester.calls_to(endpoints::CURRENT_SUMMONER), 0);
        assert_eq!(poller.connection_status().port, None);
    }

    /// Scenario: Client found, liveness ok, session phase "None".
    /// Expected: Exactly one connectivity(true) followed by one phase("None").
    #[tokio::test]
    async fn test_first_connect_announces_once() {
        let requester = Arc::new(healthy_requester("None"));
        let locator = Arc::new(ScriptedLocator::always(Some(creds())));
        let poller = make_poller(requester, locator);
        let mut rx = poller.subscribe();

        poller.tick().await;

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                LcuEvent::ConnectivityChanged { connected: true },
                LcuEvent::PhaseChanged {
                    phase: GamePhase::None,
                    game_data: None
                },
            ]
        );
        let status = poller.connection_status();
        assert!(status.connected);
        assert_eq!(status.port, Some(54321));
    }

    /// Scenario: Steady InProgress, then the session fetch fails with a network error.
    /// Expected: Disconnected, connectivity(false) emitted, credentials cleared and the
    /// locator consulted again on the following tick.
    #[tokio::test]
    async fn test_network_error_drops_connection() {
        let requester = Arc::new(healthy_requester("InProgress"));
        requester.script(
            endpoints::GAMEFLOW_SESSION,
            vec![
                Reply::Json(arena_session_json("InProgress")),
                Reply::Json(arena_session_json("InProgress")),
                Reply::Refused,
            ],
        );
        let locator = Arc::new(ScriptedLocator::always(Some(creds())));
        let poller = make_poller(requester.clone(), locator.clone());

        poller.tick().await;
        poller.tick().await;
        assert_eq!(poller.current_phase(), Some(GamePhase::InProgress));

        let mut rx = poller.subscribe();
        poller.tick().await;

        assert_eq!(
            drain(&mut rx),
            vec![LcuEvent::ConnectivityChanged { connected: false }]
        );
        assert!(!poller.is_connected());
        assert!(requester.credentials().is_none());
        assert!(poller.summoner().is_none());
        assert!(poller.latest_snapshot().is_none());
        assert_eq!(locator.calls(), 1);

        poller.tick().await;
        assert_eq!(locator.calls(), 2);
    }

    /// Scenario: Phases None, None, ChampSelect, ChampSelect, InProgress over five ticks.
    /// Expected: Exactly three phase events, in order.
    #[tokio::test]
    async fn test_phase_sequence_deduplicates() {
        let requester = Arc::new(healthy_requester("None"));
        requester.script(
            endpoints::GAMEFLOW_SESSION,
            ["None", "None", "ChampSelect", "ChampSelect", "InProgress"]
                .iter()
                .map(|p| Reply::Json(session_json(p)))
                .collect(),
        );
        let locator = Arc::new(ScriptedLocator::always(Some(creds())));
        let poller = make_poller(requester, locator);
        let mut rx = poller.subscribe();

        for _ in 0..5 {
            poller.tick().await;
        }

        let events = drain(&mut rx);
        assert_eq!(phases(&events), vec!["None", "ChampSelect", "InProgress"]);
        assert_eq!(connectivity(&events), vec![true]);
    }
}
