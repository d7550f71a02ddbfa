use std::time::Duration;

/// Running request counters kept by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Attempts that were followed by a retry.
    pub retried_requests: u64,
    /// Mean wall time of successful logical requests, retries included.
    pub average_response_time: Duration,
}

impl ApiStats {
    pub(crate) fn record_request(&mut self) {
        self.total_requests += 1;
    }

    pub(crate) fn record_retry(&mut self) {
        self.retried_requests += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_requests += 1;
    }

    pub(crate) fn record_success(&mut self, elapsed: Duration) {
        self.successful_requests += 1;
        let n = self.successful_requests as f64;
        let previous = self.average_response_time.as_secs_f64();
        let mean = previous + (elapsed.as_secs_f64() - previous) / n;
        self.average_response_time = Duration::from_secs_f64(mean.max(0.0));
    }

    /// Percentage of logical requests that succeeded.
    pub fn success_rate(&self) -> f64 {
        percentage(self.successful_requests, self.total_requests)
    }

    /// Retries per logical request, as a percentage.
    pub fn retry_rate(&self) -> f64 {
        percentage(self.retried_requests, self.total_requests)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
