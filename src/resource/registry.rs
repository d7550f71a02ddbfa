use std::collections::BTreeMap;

use super::{LiveResource, ResourceKind};

/// Holds at most one live resource per kind.
#[derive(Default)]
pub struct ResourceRegistry {
    slots: BTreeMap<ResourceKind, Box<dyn LiveResource>>,
    created: u64,
    disposed: u64,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `resource`, disposing whatever of the same kind was bound before.
    pub fn bind(&mut self, resource: Box<dyn LiveResource>) {
        let kind = resource.kind();
        self.dispose_current(kind);
        tracing::debug!(kind = ?kind, owner = resource.owner(), "Resource bound");
        self.slots.insert(kind, resource);
        self.created += 1;
    }

    /// Dispose the resource of `kind`, if any. Returns whether one was alive.
    pub fn dispose_current(&mut self, kind: ResourceKind) -> bool {
        match self.slots.remove(&kind) {
            Some(mut resource) => {
                resource.dispose();
                self.disposed += 1;
                tracing::debug!(kind = ?kind, owner = resource.owner(), "Resource disposed");
                true
            }
            None => false,
        }
    }

    /// Dispose every live resource. Returns how many were disposed.
    pub fn dispose_all(&mut self) -> usize {
        let kinds: Vec<ResourceKind> = self.slots.keys().copied().collect();
        kinds
            .into_iter()
            .filter(|kind| self.dispose_current(*kind))
            .count()
    }

    pub fn current(&self, kind: ResourceKind) -> Option<&dyn LiveResource> {
        self.slots.get(&kind).map(|r| r.as_ref())
    }

    pub fn alive_count(&self) -> usize {
        self.slots.len()
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("alive", &self.slots.keys().collect::<Vec<_>>())
            .field("created", &self.created)
            .field("disposed", &self.disposed)
            .finish()
    }
}
