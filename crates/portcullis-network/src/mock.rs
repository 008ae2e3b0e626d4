//! Mock transport for testing and development.
//!
//! Replies are scripted through a [`MockTransportHandle`]; every request the
//! transport receives is recorded with the Tokio instant it started.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::error::{ChannelError, Result};
use crate::transport::{Request, Transport};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Return this body.
    Body(Bytes),

    /// Fail with a transport error.
    Fail(String),

    /// Fail with a non-success response status.
    Status(u16),

    /// Never answer.
    Stall,
}

impl MockReply {
    pub fn body(text: impl Into<String>) -> Self {
        Self::Body(Bytes::from(text.into()))
    }
}

/// A request seen by the mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub query: String,
    pub cookie: Option<String>,
    pub started: Instant,
}

#[derive(Debug)]
struct MockState {
    replies: VecDeque<MockReply>,
    fallback: MockReply,
    latency: Duration,
    requests: Vec<RecordedRequest>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Mock transport.
///
/// Takes the next scripted reply for each exchange. When the script is empty
/// the fallback reply is used, which is a transport failure unless set with
/// [`MockTransportHandle::set_fallback`].
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> (Self, MockTransportHandle) {
        let state = Arc::new(Mutex::new(MockState {
            replies: VecDeque::new(),
            fallback: MockReply::Fail("no scripted reply".to_string()),
            latency: Duration::ZERO,
            requests: Vec::new(),
            in_flight: 0,
            max_in_flight: 0,
        }));
        let transport = Self {
            state: Arc::clone(&state),
        };
        (transport, MockTransportHandle { state })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, request: Request<'_>) -> (MockReply, Duration) {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            query: request.query.to_string(),
            cookie: request.cookie.map(str::to_string),
            started: Instant::now(),
        });
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);
        let reply = state
            .replies
            .pop_front()
            .unwrap_or_else(|| state.fallback.clone());
        (reply, state.latency)
    }

    fn finish(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl Transport for MockTransport {
    async fn exchange(&mut self, request: Request<'_>) -> Result<Bytes> {
        let (reply, latency) = self.begin(request);
        let _in_flight = InFlight(self);

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match reply {
            MockReply::Body(body) => Ok(body),
            MockReply::Fail(message) => Err(ChannelError::transport(message)),
            MockReply::Status(status) => Err(ChannelError::ResponseStatus { status }),
            MockReply::Stall => std::future::pending().await,
        }
    }
}

struct InFlight<'a>(&'a MockTransport);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Handle for scripting a mock transport.
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransportHandle {
    /// Queue a reply body.
    pub fn reply(&self, body: impl Into<String>) {
        self.push(MockReply::body(body));
    }

    /// Queue any scripted reply.
    pub fn push(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    /// Reply used once the script is exhausted.
    pub fn set_fallback(&self, reply: MockReply) {
        self.lock().fallback = reply;
    }

    /// Delay every exchange by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Largest number of exchanges that were ever in progress at once.
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
