//! Bounded retries with exponential backoff on top of [`crate::transport`].

mod coordinator;
mod error;
mod observer;
mod policy;
mod stats;

pub use coordinator::{ResourcePayload, RetryCoordinator};
pub use error::FetchError;
pub use observer::{AttemptEvent, AttemptObserver, AttemptOutcome, TracingObserver};
pub use policy::{RetryDecision, RetryPolicy};
pub use stats::ApiStats;
