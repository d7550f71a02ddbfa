/// Marker trait for view state.
///
/// States are replaced, never mutated in place, and compared with `PartialEq`
/// to decide whether a transition happened.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
