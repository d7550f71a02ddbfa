//! Configuration: TOML file, defaults and validation.

mod loader;
mod store;
mod types;

pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{ApiConfig, BackPolicy, Config, DashboardConfig, RetryConfig};
