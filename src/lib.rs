//! Reactive client runtime for the Centro de Control electoral dashboard.
//!
//! Layers, leaf to root: [`transport`] issues single HTTP calls,
//! [`retry`] adds bounded retries, [`api`] types the three endpoints,
//! [`store`] holds shared state, [`resource`] tracks live charts and
//! [`ui`] runs the view state machine on top of all of them.

pub mod api;
pub mod cancel;
pub mod config;
pub mod logging;
pub mod resource;
pub mod retry;
pub mod store;
pub mod transport;
pub mod ui;
