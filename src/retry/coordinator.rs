use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::cancel::CancelSignal;
use crate::config::Config;
use crate::retry::error::FetchError;
use crate::retry::observer::{AttemptEvent, AttemptObserver, AttemptOutcome, TracingObserver};
use crate::retry::policy::{RetryDecision, RetryPolicy};
use crate::retry::stats::ApiStats;
use crate::transport::{RequestDescriptor, Transport, TransportError};

/// Body of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePayload {
    pub status: u16,
    pub body: Vec<u8>,
    /// Attempts it took, the successful one included.
    pub attempts: u32,
    /// Wall time across every attempt and backoff.
    pub elapsed: Duration,
}

impl ResourcePayload {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Per-call bookkeeping; lives only for the duration of one `fetch_resource`.
struct RetryState {
    attempt: u32,
    last_error: Option<TransportError>,
    started: Instant,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempt: 0,
            last_error: None,
            started: Instant::now(),
        }
    }
}

/// Sole retry authority: wraps a [`Transport`] with bounded attempts and
/// exponential backoff.
pub struct RetryCoordinator<T: Transport> {
    transport: T,
    base_url: String,
    policy: RetryPolicy,
    observer: Arc<dyn AttemptObserver>,
    stats: Mutex<ApiStats>,
}

impl<T: Transport> RetryCoordinator<T> {
    pub fn new(transport: T, base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            policy,
            observer: Arc::new(TracingObserver),
            stats: Mutex::new(ApiStats::default()),
        }
    }

    pub fn from_config(transport: T, config: &Config) -> Self {
        Self::new(
            transport,
            config.api.base_url.clone(),
            RetryPolicy::from(&config.retry),
        )
    }

    /// Replace the default tracing observer.
    pub fn with_observer(mut self, observer: Arc<dyn AttemptObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn stats(&self) -> ApiStats {
        *self.stats.lock()
    }

    pub fn reset_stats(&self) {
        *self.stats.lock() = ApiStats::default();
        tracing::info!("API statistics reset");
    }

    /// Fetch the resource described by `descriptor`.
    ///
    /// Fails with [`FetchError::ExhaustedRetries`] only once
    /// `descriptor.total_attempts()` attempts have failed with retryable errors.
    /// Non-retryable outcomes return after the attempt that produced them.
    pub async fn fetch_resource(
        &self,
        descriptor: &RequestDescriptor,
        cancel: &CancelSignal,
    ) -> Result<ResourcePayload, FetchError> {
        let request = descriptor
            .resolve(&self.base_url)
            .map_err(FetchError::InvalidRequest)?;
        let url = request.url.to_string();
        let total_attempts = descriptor.total_attempts();

        self.stats.lock().record_request();
        let mut state = RetryState::new();

        loop {
            state.attempt += 1;
            let attempt_started = Instant::now();
            let result = self.transport.send(&request, cancel).await;
            let attempt_elapsed = attempt_started.elapsed();

            let error = match result {
                Ok(response) => {
                    self.observer.on_attempt(&AttemptEvent {
                        method: request.method.clone(),
                        url: url.clone(),
                        attempt: state.attempt,
                        total_attempts,
                        outcome: AttemptOutcome::Success {
                            status: response.status,
                        },
                        elapsed: attempt_elapsed,
                        next_delay: None,
                    });
                    let elapsed = state.started.elapsed();
                    self.stats.lock().record_success(elapsed);
                    return Ok(ResourcePayload {
                        status: response.status,
                        body: response.body,
                        attempts: state.attempt,
                        elapsed,
                    });
                }
                Err(error) => error,
            };

            let decision = self.policy.classify(&error);
            let budget_left = state.attempt < total_attempts;
            let next_delay = (decision == RetryDecision::Retry && budget_left)
                .then(|| RetryPolicy::backoff_delay(descriptor.backoff_base(), state.attempt));

            self.observer.on_attempt(&AttemptEvent {
                method: request.method.clone(),
                url: url.clone(),
                attempt: state.attempt,
                total_attempts,
                outcome: AttemptOutcome::Failed {
                    error: error.clone(),
                    retryable: decision == RetryDecision::Retry,
                },
                elapsed: attempt_elapsed,
                next_delay,
            });

            if let Some(delay) = next_delay {
                self.stats.lock().record_retry();
                state.last_error = Some(error);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        self.stats.lock().record_failure();
                        return Err(FetchError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
                continue;
            }

            self.stats.lock().record_failure();
            let failure = match decision {
                RetryDecision::Retry => FetchError::ExhaustedRetries {
                    attempts: state.attempt,
                    last: error,
                },
                RetryDecision::NotFound => FetchError::NotFound { url },
                RetryDecision::ClientError => FetchError::ClientError {
                    status: error.status().unwrap_or_default(),
                    url,
                },
                RetryDecision::UnexpectedStatus => FetchError::UnexpectedStatus {
                    status: error.status().unwrap_or_default(),
                    url,
                },
                RetryDecision::Abort => match error {
                    TransportError::Cancelled => FetchError::Cancelled,
                    other => FetchError::InvalidRequest(other),
                },
            };

            tracing::debug!(
                attempts = state.attempt,
                elapsed_ms = state.started.elapsed().as_millis() as u64,
                previous_error = state.last_error.as_ref().map(|e| e.error_type()),
                error_type = failure.error_type(),
                "Fetch resolved with failure"
            );
            return Err(failure);
        }
    }

    /// [`fetch_resource`](Self::fetch_resource) followed by schema decoding.
    pub async fn fetch_json<R: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        cancel: &CancelSignal,
    ) -> Result<R, FetchError> {
        let payload = self.fetch_resource(descriptor, cancel).await?;
        payload.json()
    }
}
