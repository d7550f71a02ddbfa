use std::time::Duration;

use reqwest::Method;

use crate::transport::TransportError;

/// Result of a single attempt as reported to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success { status: u16 },
    Failed { error: TransportError, retryable: bool },
}

/// One observability event, emitted exactly once per attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptEvent {
    pub method: Method,
    pub url: String,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Total attempts allowed for this request.
    pub total_attempts: u32,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
    /// Delay before the next attempt, when one will be made.
    pub next_delay: Option<Duration>,
}

/// Sink for per-attempt events.
pub trait AttemptObserver: Send + Sync {
    fn on_attempt(&self, event: &AttemptEvent);
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AttemptObserver for TracingObserver {
    fn on_attempt(&self, event: &AttemptEvent) {
        match &event.outcome {
            AttemptOutcome::Success { status } => tracing::info!(
                method = %event.method,
                url = %event.url,
                attempt = event.attempt,
                total_attempts = event.total_attempts,
                status,
                elapsed_ms = event.elapsed.as_millis() as u64,
                "Request succeeded"
            ),
            AttemptOutcome::Failed { error, retryable } => match event.next_delay {
                Some(delay) => tracing::warn!(
                    method = %event.method,
                    url = %event.url,
                    attempt = event.attempt,
                    total_attempts = event.total_attempts,
                    error_type = error.error_type(),
                    error = %error,
                    retry_in_ms = delay.as_millis() as u64,
                    "Request failed, retrying"
                ),
                None => tracing::error!(
                    method = %event.method,
                    url = %event.url,
                    attempt = event.attempt,
                    total_attempts = event.total_attempts,
                    error_type = error.error_type(),
                    error = %error,
                    retryable,
                    "Request failed"
                ),
            },
        }
    }
}
