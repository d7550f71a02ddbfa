//! Keyed reactive state shared by the dashboard.
//!
//! Values are JSON documents behind `Arc`, so readers get immutable snapshots
//! and writers always replace whole values.

mod state;
mod subscription;

pub use state::{Store, StoreStats, WriteOutcome, WILDCARD};
pub use subscription::{Callback, Change, SubscriberError, Unsubscribe};

/// Keys written by the view controller.
pub mod keys {
    pub const MUNICIPALITIES: &str = "municipalities";
    pub const METADATA: &str = "metadata";
    pub const CURRENT_MUNICIPALITY: &str = "current_municipality";
    pub const API_CONNECTED: &str = "api_connected";
    pub const CURRENT_VIEW: &str = "current_view";
    pub const LOADING_MESSAGE: &str = "loading_message";
    pub const ERROR: &str = "error";
    pub const FETCH_OUTCOME: &str = "fetch_outcome";
    pub const CHART_KIND: &str = "chart_kind";
}
