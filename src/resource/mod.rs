//! Live visual resources owned by the active view.

mod chart;
mod registry;

pub use chart::{ChartKind, ChartSpec, DetachedChart, DetachedFactory, ResourceFactory};
pub use registry::ResourceRegistry;

/// Resource slot. A registry keeps at most one resource per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Chart,
}

/// A resource that must be released before it is replaced.
pub trait LiveResource: Send {
    fn kind(&self) -> ResourceKind;

    /// Identifies the view state that created the resource.
    fn owner(&self) -> &str;

    /// Release the resource. Called exactly once by the registry.
    fn dispose(&mut self);
}
