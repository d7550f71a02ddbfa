use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resource::ChartKind;

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Where the electoral API lives and how long a single call may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the API (e.g., "https://gt.example.org").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the municipality list endpoint.
    #[serde(default = "default_list_endpoint")]
    pub list_endpoint: String,
    /// Path template of the detail endpoint. Must contain `{id}`.
    #[serde(default = "default_detail_endpoint")]
    pub detail_endpoint: String,
    /// Path of the health endpoint.
    #[serde(default = "default_health_endpoint")]
    pub health_endpoint: String,
    /// Hard timeout of a single attempt in milliseconds (default: 10000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Retry budget shared by every request descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff in milliseconds (default: 1000).
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// HTTP statuses treated as transient server errors.
    #[serde(default = "default_retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
}

/// Dashboard behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Whether leaving the results view refetches the municipality list.
    #[serde(default)]
    pub back_policy: BackPolicy,
    /// Chart kind used when a results view is first mounted.
    #[serde(default)]
    pub default_chart: ChartKind,
}

/// Policy applied when the user returns from results to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BackPolicy {
    /// Always show the last known list.
    Reuse,
    /// Always fetch the list again.
    Refetch,
    /// Fetch again only when the list is older than `max_age_seconds` or empty.
    RefetchIfStale { max_age_seconds: u64 },
}

impl Default for BackPolicy {
    fn default() -> Self {
        BackPolicy::RefetchIfStale {
            max_age_seconds: 300,
        }
    }
}

impl BackPolicy {
    /// Whether returning to the selector should fetch the list again.
    ///
    /// `age` is how long ago the list was loaded; `None` means never.
    pub fn requires_refetch(&self, age: Option<Duration>, list_is_empty: bool) -> bool {
        if list_is_empty {
            return true;
        }
        match self {
            BackPolicy::Reuse => false,
            BackPolicy::Refetch => true,
            BackPolicy::RefetchIfStale { max_age_seconds } => match age {
                Some(age) => age > Duration::from_secs(*max_age_seconds),
                None => true,
            },
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_list_endpoint() -> String {
    "/api/municipios".to_string()
}

fn default_detail_endpoint() -> String {
    "/api/municipios/{id}".to_string()
}

fn default_health_endpoint() -> String {
    "/api/health".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    1_000
}

fn default_retryable_statuses() -> Vec<u16> {
    vec![500, 502, 503, 504]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            list_endpoint: default_list_endpoint(),
            detail_endpoint: default_detail_endpoint(),
            health_endpoint: default_health_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            retryable_statuses: default_retryable_statuses(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            back_policy: BackPolicy::default(),
            default_chart: ChartKind::default(),
        }
    }
}
