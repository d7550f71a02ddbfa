/// Marker trait for intents: user actions and fetch outcomes alike.
pub trait Intent: Send + 'static {}
