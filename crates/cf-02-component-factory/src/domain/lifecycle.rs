//! # Lifecycle Coordination
//!
//! Bookkeeping for one outermost resolution pass:
//!
//! - the current recursion level
//! - objects created without configuration, each tagged with the level it
//!   was created at, configured innermost-first when a shallower call
//!   releases its level
//! - objects whose configuration finished, in completion order, waiting
//!   for their post-configure hook
//!
//! This module holds data only; the factory service drives it.

use super::component::BoundComponent;
use shared_types::ComponentId;

/// A created object waiting for `configure()` or for its post-configure
/// hook.
#[derive(Debug, Clone)]
pub struct PendingComponent {
    /// Canonical group path.
    pub path: String,
    pub bound: BoundComponent,
}

impl PendingComponent {
    pub fn id(&self) -> ComponentId {
        self.bound.id
    }
}

#[derive(Debug, Clone)]
struct DeferredConfigure {
    pending: PendingComponent,
    level: usize,
}

#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    level: usize,
    to_configure: Vec<DeferredConfigure>,
    configured: Vec<PendingComponent>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// True outside any resolution.
    pub fn is_idle(&self) -> bool {
        self.level == 0
    }

    /// Start an outermost pass with empty queues.
    pub fn begin_pass(&mut self) {
        self.to_configure.clear();
        self.configured.clear();
    }

    /// Enter one nested resolution, returning the new level.
    pub fn enter(&mut self) -> usize {
        self.level += 1;
        self.level
    }

    pub fn leave(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Record an object created at `level` whose configuration is
    /// postponed.
    pub fn defer_configure(&mut self, pending: PendingComponent, level: usize) {
        self.to_configure.push(DeferredConfigure { pending, level });
    }

    /// Most recent postponed object created deeper than `level`.
    pub fn pop_deeper_than(&mut self, level: usize) -> Option<PendingComponent> {
        if self.to_configure.last().is_some_and(|d| d.level > level) {
            self.to_configure.pop().map(|d| d.pending)
        } else {
            None
        }
    }

    /// Drop every postponed object created deeper than `level` without
    /// configuring it. Returns how many were dropped.
    pub fn discard_deeper_than(&mut self, level: usize) -> usize {
        let before = self.to_configure.len();
        self.to_configure.retain(|d| d.level <= level);
        before - self.to_configure.len()
    }

    /// Forget a postponed object that got configured on demand.
    pub fn remove_deferred(&mut self, id: ComponentId) -> Option<PendingComponent> {
        let pos = self.to_configure.iter().position(|d| d.pending.id() == id)?;
        Some(self.to_configure.remove(pos).pending)
    }

    pub fn push_configured(&mut self, pending: PendingComponent) {
        self.configured.push(pending);
    }

    /// Configured objects in completion order, emptying the queue.
    pub fn take_configured(&mut self) -> Vec<PendingComponent> {
        std::mem::take(&mut self.configured)
    }

    pub fn deferred_len(&self) -> usize {
        self.to_configure.len()
    }

    /// Remove a destroyed object from both queues.
    pub fn forget(&mut self, id: ComponentId) {
        self.to_configure.retain(|d| d.pending.id() != id);
        self.configured.retain(|p| p.id() != id);
    }
}
