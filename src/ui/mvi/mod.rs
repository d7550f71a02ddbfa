//! Model-View-Intent primitives for the dashboard.
//!
//! ```text
//! user input / fetch outcome ──→ Intent ──→ Reducer ──→ State ──→ ViewDescription
//!          ↑                                               │
//!          └───────────── effects (fetch, resources) ──────┘
//! ```
//!
//! Reducers are pure. Effects are derived by the controller by comparing the
//! state before and after a reduction.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
