//! # Destruction
//!
//! Components are destroyed parents first. For each one, in order:
//!
//! 1. observers are told about the destruction
//! 2. the component's `on_destroy` hook runs
//! 3. its resources are deleted, subscribers receive `Deleted`
//! 4. its own subscriptions are dropped
//!
//! Bound slots are reset before any hook runs, so a hook never sees a
//! half-destroyed group as created.

use super::*;
use crate::domain::resources::NotifeeRef;
use cf_telemetry::log_component_event;
use cf_telemetry::metrics::{COMPONENTS_DESTROYED, LIVE_COMPONENTS};
use shared_types::{ResourceChange, TreeError};

impl ConfigurationManager {
    /// Destroy every component of the tree, keeping the parameters.
    /// Returns how many were destroyed.
    pub fn destroy_all_components(&self) -> usize {
        // The root always exists.
        self.destroy_subtree("").unwrap_or_default()
    }

    pub(crate) fn destroy_subtree(&self, path: &str) -> Result<usize, TreeError> {
        let _guard = self.lock();
        let taken = self.with_state(|st| st.tree.take_bound_subtree(path))?;
        for (component_path, bound) in &taken {
            self.finish_destruction(component_path, bound);
        }
        Ok(taken.len())
    }

    /// Destroy one component whose creation or configuration failed.
    pub(crate) fn destroy_single(&self, path: &str, bound: &BoundComponent) {
        let _guard = self.lock();
        let unbound = self.with_state(|st| st.tree.unbind(path));
        if let Err(e) = unbound {
            tracing::warn!(path = %path, error = %e, "[Factory] Group vanished during rollback");
        }
        self.finish_destruction(path, bound);
    }

    fn finish_destruction(&self, path: &str, bound: &BoundComponent) {
        for observer in self.observers() {
            observer.on_component_destruction(path, &bound.handle);
        }
        bound.handle.on_destroy();

        let id = bound.id;
        let removed = self.with_state(|st| {
            st.live.remove(&id);
            st.lifecycle.forget(id);
            st.resources.unsubscribe_all(&NotifeeRef::Component(id));
            st.resources.delete_owned_by(id)
        });
        for (name, _) in &removed {
            self.notify_resource_change(name, id, ResourceChange::Deleted);
        }
        drop(removed);

        COMPONENTS_DESTROYED.inc();
        LIVE_COMPONENTS.dec();
        log_component_event!(
            debug,
            "[Factory] Component destroyed",
            path = %path,
            type_name = %bound.type_name,
            id = %id
        );
    }
}
