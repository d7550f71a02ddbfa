use std::time::Duration;

use crate::config::RetryConfig;
use crate::transport::TransportError;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Transient: try again if budget remains.
    Retry,
    /// 404: stop and report not found.
    NotFound,
    /// Other 4xx: stop and report a client error.
    ClientError,
    /// Non-success status outside the retryable set.
    UnexpectedStatus,
    /// Cancelled by the caller or unusable request: stop.
    Abort,
}

/// Retryable-error classification and backoff schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    retryable_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn new(retryable_statuses: Vec<u16>) -> Self {
        Self { retryable_statuses }
    }

    pub fn classify(&self, error: &TransportError) -> RetryDecision {
        match error {
            TransportError::NetworkFailure { .. } | TransportError::Timeout { .. } => {
                RetryDecision::Retry
            }
            // 4xx is never retried, whatever the configured set says
            TransportError::HttpStatus { status, .. } => {
                if *status == 404 {
                    RetryDecision::NotFound
                } else if error.is_client_error() {
                    RetryDecision::ClientError
                } else if self.retryable_statuses.contains(status) {
                    RetryDecision::Retry
                } else {
                    RetryDecision::UnexpectedStatus
                }
            }
            TransportError::Cancelled | TransportError::InvalidUrl { .. } => RetryDecision::Abort,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based) before the next one.
    ///
    /// `base * 2^(attempt - 1)`, saturating instead of overflowing.
    pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.retryable_statuses.clone())
    }
}
