//! Dashboard view state machine.

mod failure;
mod intent;
mod reducer;
mod state;

pub use failure::{
    Failure, Operation, Recovery, DEFAULT_MESSAGE, NETWORK_MESSAGE, NOT_FOUND_MESSAGE,
    TIMEOUT_MESSAGE,
};
pub use intent::DashboardIntent;
pub use reducer::DashboardReducer;
pub use state::{filter_entities, DashboardState, ViewState};
