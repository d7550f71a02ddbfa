pub mod controller;
pub mod dashboard;
pub mod mvi;
pub mod outcome;
pub mod view;

pub use controller::ViewController;
pub use outcome::{FetchOutcome, OutcomeResult};
pub use view::ViewDescription;
