//! In-process transport with scripted replies, for deterministic tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use centro_control::cancel::CancelSignal;
use centro_control::retry::{AttemptEvent, AttemptObserver};
use centro_control::transport::{RawResponse, ResolvedRequest, Transport, TransportError};

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub result: Result<(u16, String), TransportError>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            result: Ok((200, body.to_string())),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            result: Err(TransportError::HttpStatus {
                status,
                body: String::new(),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn timeout() -> Self {
        Self {
            result: Err(TransportError::Timeout {
                timeout: Duration::from_secs(10),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn network() -> Self {
        Self {
            result: Err(TransportError::NetworkFailure {
                message: "connection refused".into(),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A call seen by the transport.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub at: tokio::time::Instant,
}

#[derive(Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    calls: Vec<Call>,
}

/// Transport answering from per-path scripts. The last reply of a path
/// repeats once the script runs out.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, path: &str, replies: impl IntoIterator<Item = Reply>) -> &Self {
        self.script
            .lock()
            .replies
            .entry(path.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().calls.clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.path == path)
            .count()
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut script = self.script.lock();
        script.calls.push(Call {
            path: path.to_string(),
            at: tokio::time::Instant::now(),
        });
        match script.replies.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| Reply::status(404)),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| Reply::status(404)),
            None => Reply::status(404),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &ResolvedRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, TransportError> {
        let reply = self.next_reply(request.url.path());

        if !reply.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                _ = tokio::time::sleep(reply.delay) => {}
            }
        }

        reply.result.map(|(status, body)| RawResponse {
            status,
            body: body.into_bytes(),
            elapsed: reply.delay,
        })
    }
}

/// Observer that keeps every attempt event.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AttemptEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<AttemptEvent> {
        self.events.lock().clone()
    }
}

impl AttemptObserver for RecordingObserver {
    fn on_attempt(&self, event: &AttemptEvent) {
        self.events.lock().push(event.clone());
    }
}
