//! # Resource API
//!
//! Manager-level access to the resource broker. Notifications are
//! delivered after the broker bookkeeping is done, outside any state
//! borrow, so a notifee may call back into the manager.

use super::*;
use crate::domain::resources::{NotifeeRef, ResourceValue};
use crate::ports::outbound::ResourceChangeNotifee;
use cf_01_config_tree::paths::tree_distance;
use cf_telemetry::metrics::RESOURCE_NOTIFICATIONS;
use shared_types::{ResourceChange, ResourceError};
use std::any::Any;
use tracing::trace;

/// Who receives resource change notifications.
#[derive(Clone)]
pub enum Notifee {
    /// A live component, called through [`Component::resource_changed`].
    Component(ComponentId),
    /// Any other receiver, held weakly by the manager.
    External(Arc<dyn ResourceChangeNotifee>),
}

impl Notifee {
    fn to_ref(&self) -> NotifeeRef {
        match self {
            Notifee::Component(id) => NotifeeRef::Component(*id),
            Notifee::External(notifee) => NotifeeRef::external(notifee),
        }
    }
}

enum Delivery {
    Component(ComponentHandle),
    External(Arc<dyn ResourceChangeNotifee>),
}

impl Delivery {
    fn deliver(&self, name: &str, owner: ComponentId, change: ResourceChange) {
        match self {
            Delivery::Component(handle) => handle.resource_changed(name, owner, change),
            Delivery::External(notifee) => notifee.resource_changed(name, owner, change),
        }
    }
}

impl ConfigurationManager {
    // =========================================================================
    // SLOTS
    // =========================================================================

    /// Create or overwrite the `(name, owner)` slot; `None` declares it null.
    pub fn declare_resource(&self, name: &str, owner: ComponentId, value: Option<ResourceValue>) {
        let _guard = self.lock();
        let (change, previous) = self.with_state(|st| st.resources.declare(name, owner, value));
        drop(previous);
        self.notify_resource_change(name, owner, change);
    }

    pub fn delete_resource(&self, name: &str, owner: ComponentId) -> Result<(), ResourceError> {
        let _guard = self.lock();
        let removed = self.with_state(|st| st.resources.delete(name, owner))?;
        drop(removed);
        self.notify_resource_change(name, owner, ResourceChange::Deleted);
        Ok(())
    }

    pub fn resource_exists(&self, name: &str, owner: ComponentId) -> bool {
        self.read_state(|st| st.resources.exists(name, owner))
    }

    pub fn resource_owners(&self, name: &str) -> Vec<ComponentId> {
        self.read_state(|st| st.resources.owners(name))
    }

    /// Untyped value of a slot; `Ok(None)` for a null slot.
    pub fn resource_dyn(
        &self,
        name: &str,
        owner: ComponentId,
    ) -> Result<Option<ResourceValue>, ResourceError> {
        self.read_state(|st| st.resources.get(name, owner))
    }

    /// Typed value of a slot; `Ok(None)` for a null slot.
    pub fn resource<T: Any + Send + Sync>(
        &self,
        name: &str,
        owner: ComponentId,
    ) -> Result<Option<Arc<T>>, ResourceError> {
        let value = self.resource_dyn(name, owner)?;
        downcast_value(name, value)
    }

    /// Slot `name` of the owner whose group is nearest to `from_group` in
    /// the tree. Owners with no live group are ignored.
    pub fn nearest_resource<T: Any + Send + Sync>(
        &self,
        name: &str,
        from_group: &str,
    ) -> Result<(ComponentId, Option<Arc<T>>), ResourceError> {
        let from = self
            .canonical_path(from_group)
            .unwrap_or_else(|_| from_group.to_string());
        let candidates: Vec<(ComponentId, usize)> = self.read_state(|st| {
            st.resources
                .owners(name)
                .into_iter()
                .filter_map(|id| st.live.get(&id).map(|l| (id, tree_distance(&l.path, &from))))
                .collect()
        });

        let nearest = candidates
            .iter()
            .map(|(_, d)| *d)
            .min()
            .ok_or_else(|| ResourceError::NotFound {
                name: name.to_string(),
            })?;
        let at_nearest: Vec<ComponentId> = candidates
            .iter()
            .filter(|(_, d)| *d == nearest)
            .map(|(id, _)| *id)
            .collect();
        if at_nearest.len() > 1 {
            return Err(ResourceError::Ambiguous {
                name: name.to_string(),
                candidates: at_nearest.len(),
            });
        }
        let owner = at_nearest[0];
        Ok((owner, self.resource::<T>(name, owner)?))
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Watch `name`, from `owner` or from any owner. Requests made while a
    /// resolution runs are queued until the outermost one finishes.
    pub fn request_notification(&self, notifee: Notifee, name: &str, owner: Option<ComponentId>) {
        self.with_state(|st| {
            let deferred = !st.lifecycle.is_idle();
            st.resources.subscribe(notifee.to_ref(), name, owner, deferred);
        });
    }

    pub fn remove_notification(
        &self,
        notifee: &Notifee,
        name: &str,
        owner: Option<ComponentId>,
    ) -> bool {
        self.with_state(|st| st.resources.unsubscribe(&notifee.to_ref(), name, owner))
    }

    pub fn remove_all_notifications(&self, notifee: &Notifee) {
        self.with_state(|st| st.resources.unsubscribe_all(&notifee.to_ref()));
    }

    pub(crate) fn notify_resource_change(&self, name: &str, owner: ComponentId, change: ResourceChange) {
        let targets: Vec<Delivery> = self.with_state(|st| {
            let subscribers = st.resources.subscribers_for(name, owner);
            subscribers
                .into_iter()
                .filter_map(|notifee| match notifee {
                    NotifeeRef::Component(id) => st
                        .live
                        .get(&id)
                        .and_then(|l| l.handle.upgrade())
                        .map(Delivery::Component),
                    NotifeeRef::External(weak) => weak.upgrade().map(Delivery::External),
                })
                .collect()
        });
        if targets.is_empty() {
            return;
        }
        trace!(resource = %name, owner = %owner, change = change.as_str(), receivers = targets.len(), "[Resources] Notifying");
        for target in &targets {
            target.deliver(name, owner, change);
            RESOURCE_NOTIFICATIONS
                .with_label_values(&[change.as_str()])
                .inc();
        }
    }
}

fn downcast_value<T: Any + Send + Sync>(
    name: &str,
    value: Option<ResourceValue>,
) -> Result<Option<Arc<T>>, ResourceError> {
    match value {
        None => Ok(None),
        Some(value) => value
            .downcast::<T>()
            .map(Some)
            .map_err(|_| ResourceError::WrongType {
                name: name.to_string(),
                requested: std::any::type_name::<T>(),
            }),
    }
}
