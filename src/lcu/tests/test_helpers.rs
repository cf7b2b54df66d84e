// Test helpers and scripted doubles for poller tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::lcu::client::{endpoints, LcuRequester};
use crate::lcu::error::LcuError;
use crate::lcu::locator::CredentialLocator;
use crate::lcu::poller::{PollerConfig, SessionPoller};
use crate::lcu::types::{ConnectionCredentials, LcuEvent, ARENA_QUEUE_ID};

pub const LCU_PUUID: &str = "0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d";
pub const DASHED_PUUID: &str = "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d";

/// One canned response from the fake client.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Refused,
    Unauthorized,
    NotFound,
    ServerError,
    Garbage,
}

impl Reply {
    fn into_result(self, endpoint: &str) -> Result<Value, LcuError> {
        match self {
            Reply::Json(v) => Ok(v),
            Reply::Refused => Err(LcuError::unreachable(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            ))),
            Reply::Unauthorized => Err(LcuError::from_status(
                endpoint,
                reqwest::StatusCode::UNAUTHORIZED,
            )),
            Reply::NotFound => Err(LcuError::from_status(endpoint, reqwest::StatusCode::NOT_FOUND)),
            Reply::ServerError => Err(LcuError::from_status(
                endpoint,
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            )),
            Reply::Garbage => Err(LcuError::malformed(endpoint, "expected value at line 1")),
        }
    }
}

/// Fake local client. Each endpoint has a queue of replies; the last reply
/// sticks once the queue is down to one entry. Unscripted endpoints 404.
#[derive(Default)]
pub struct ScriptedRequester {
    credentials: Mutex<Option<ConnectionCredentials>>,
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedRequester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn script(&self, endpoint: &str, replies: Vec<Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), replies.into_iter().collect());
    }

    /// Replace the endpoint's script with a single sticky reply.
    pub fn set_reply(&self, endpoint: &str, reply: Reply) {
        self.script(endpoint, vec![reply]);
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == endpoint)
            .count()
    }
}

#[async_trait]
impl LcuRequester for ScriptedRequester {
    fn credentials(&self) -> Option<ConnectionCredentials> {
        self.credentials.lock().unwrap().clone()
    }

    fn set_credentials(&self, credentials: ConnectionCredentials) {
        *self.credentials.lock().unwrap() = Some(credentials);
    }

    fn clear_credentials(&self) {
        *self.credentials.lock().unwrap() = None;
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value, LcuError> {
        if self.credentials().is_none() {
            return Err(LcuError::NotConnected);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(endpoint.to_string());

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(endpoint) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        reply.unwrap_or(Reply::NotFound).into_result(endpoint)
    }
}

/// Fake locator with a queue of answers; the last one sticks.
pub struct ScriptedLocator {
    answers: Mutex<VecDeque<Option<ConnectionCredentials>>>,
    calls: AtomicUsize,
}

impl ScriptedLocator {
    pub fn new(answers: Vec<Option<ConnectionCredentials>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(answer: Option<ConnectionCredentials>) -> Self {
        Self::new(vec![answer])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialLocator for ScriptedLocator {
    async fn locate(&self) -> Option<ConnectionCredentials> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.pop_front().flatten()
        } else {
            answers.front().cloned().flatten()
        }
    }
}

pub fn creds() -> ConnectionCredentials {
    ConnectionCredentials::new(54321, "test_token")
}

pub fn summoner_json() -> Value {
    json!({
        "puuid": LCU_PUUID,
        "summonerId": 4242,
        "displayName": "",
        "gameName": "Tester",
        "tagLine": "EUW",
        "summonerLevel": 321,
        "profileIconId": 29
    })
}

pub fn rso_json(platform: &str) -> Value {
    json!({ "currentPlatformId": platform })
}

pub fn session_json(phase: &str) -> Value {
    json!({ "phase": phase })
}

pub fn arena_session_json(phase: &str) -> Value {
    json!({
        "phase": phase,
        "gameData": {
            "gameId": 9001,
            "queue": { "id": ARENA_QUEUE_ID, "mapId": 30, "gameMode": "CHERRY" },
            "playerChampionSelections": [
                { "cellId": 0, "championId": 86, "championName": "Garen", "puuid": LCU_PUUID, "teamId": 1 },
                { "cellId": 1, "championId": 99, "championName": "Lux", "puuid": "ffffffffffffffffffffffffffffffff", "teamId": 1 }
            ]
        }
    })
}

/// A client that is up, logged in on EUW and sitting in `phase`.
pub fn healthy_requester(phase: &str) -> ScriptedRequester {
    let requester = ScriptedRequester::new();
    requester.set_reply(endpoints::CURRENT_SUMMONER, Reply::Json(summoner_json()));
    requester.set_reply(endpoints::RSO_AUTHORIZATION, Reply::Json(rso_json("EUW1")));
    requester.set_reply(endpoints::GAMEFLOW_SESSION, Reply::Json(session_json(phase)));
    requester
}

pub fn test_config() -> PollerConfig {
    PollerConfig {
        poll_interval: Duration::from_millis(20),
        target_queue_id: ARENA_QUEUE_ID,
        event_capacity: 256,
    }
}

pub fn make_poller(
    requester: Arc<ScriptedRequester>,
    locator: Arc<ScriptedLocator>,
) -> SessionPoller {
    SessionPoller::new(requester, locator, test_config())
}

/// Everything currently queued on the receiver.
pub fn drain(rx: &mut broadcast::Receiver<LcuEvent>) -> Vec<LcuEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn phases(events: &[LcuEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            LcuEvent::PhaseChanged { phase, .. } => Some(phase.to_string()),
            _ => None,
        })
        .collect()
}

pub fn connectivity(events: &[LcuEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            LcuEvent::ConnectivityChanged { connected } => Some(*connected),
            _ => None,
        })
        .collect()
}
