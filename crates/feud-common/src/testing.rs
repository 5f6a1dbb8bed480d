/// Test doubles: a virtual clock and a scripted upstream.
///
/// Compiled for this crate's own tests and, through the `testing` feature, for
/// dependent crates' tests. Neither type waits or touches the network.
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use reqwest::StatusCode;

use crate::error::TransportError;
use crate::pacing::Pacer;
use crate::transport::{RawResponse, SuggestTransport};

/// Clock that only moves when something sleeps on it.
pub struct FakePacer {
    start: Instant,
    elapsed: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl FakePacer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Default for FakePacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for FakePacer {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Upstream that replays queued responses per query.
///
/// Queries with nothing queued answer `200 [query, []]`.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: RefCell<HashMap<String, VecDeque<Result<RawResponse, TransportError>>>>,
    calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, query: &str, outcome: Result<RawResponse, TransportError>) {
        self.scripts
            .borrow_mut()
            .entry(query.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Queue a 200 response with a raw body.
    pub fn respond(&self, query: &str, body: impl Into<String>) {
        self.push(query, Ok(RawResponse::new(StatusCode::OK, body)));
    }

    /// Queue a 200 response in the provider's `[query, [suggestions]]` shape.
    pub fn suggestions(&self, query: &str, items: &[&str]) {
        let body = serde_json::json!([query, items]).to_string();
        self.respond(query, body);
    }

    /// Queue an empty-bodied response with the given status.
    pub fn status(&self, query: &str, status: StatusCode) {
        self.push(query, Ok(RawResponse::new(status, "")));
    }

    /// Queue a transport failure.
    pub fn fail(&self, query: &str, message: &str) {
        self.push(query, Err(TransportError::Unreachable(message.to_string())));
    }

    /// Queries received, in order, one entry per attempt.
    pub fn queries(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(_, ua)| ua.clone()).collect()
    }
}

impl SuggestTransport for ScriptedTransport {
    async fn fetch_raw(
        &self,
        query: &str,
        user_agent: &str,
    ) -> Result<RawResponse, TransportError> {
        self.calls
            .borrow_mut()
            .push((query.to_string(), user_agent.to_string()));

        let next = self
            .scripts
            .borrow_mut()
            .get_mut(query)
            .and_then(VecDeque::pop_front);
        match next {
            Some(outcome) => outcome,
            None => Ok(RawResponse::new(
                StatusCode::OK,
                serde_json::json!([query, []]).to_string(),
            )),
        }
    }
}
