//! # Resource Broker
//!
//! Named, typed values published by components and addressed by
//! `(name, owner)`. A slot may hold a value or be declared null.
//!
//! Subscriptions match a name and, optionally, one owner. Requests made
//! while a resolution is running are kept pending and only become active
//! once the outermost resolution has finished.
//!
//! The broker is plain data: it reports who must be notified, and the
//! caller delivers the notifications after releasing its own locks.

use crate::ports::outbound::ResourceChangeNotifee;
use shared_types::{ComponentId, ResourceChange, ResourceError};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// Value stored in a resource slot.
pub type ResourceValue = Arc<dyn Any + Send + Sync>;

/// Who a subscription notifies.
#[derive(Clone)]
pub enum NotifeeRef {
    /// A live component, looked up by id at delivery time.
    Component(ComponentId),
    /// An external notifee, held weakly.
    External(Weak<dyn ResourceChangeNotifee>),
}

impl NotifeeRef {
    pub fn external(notifee: &Arc<dyn ResourceChangeNotifee>) -> Self {
        NotifeeRef::External(Arc::downgrade(notifee))
    }

    fn same_as(&self, other: &NotifeeRef) -> bool {
        match (self, other) {
            (NotifeeRef::Component(a), NotifeeRef::Component(b)) => a == b,
            (NotifeeRef::External(a), NotifeeRef::External(b)) => {
                std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
            }
            _ => false,
        }
    }

    fn is_dead(&self) -> bool {
        matches!(self, NotifeeRef::External(w) if w.strong_count() == 0)
    }
}

#[derive(Clone)]
struct Subscription {
    notifee: NotifeeRef,
    name: String,
    owner: Option<ComponentId>,
}

impl Subscription {
    fn matches(&self, name: &str, owner: ComponentId) -> bool {
        self.name == name && self.owner.map_or(true, |o| o == owner)
    }

    fn same_request(&self, other: &Subscription) -> bool {
        self.name == other.name && self.owner == other.owner && self.notifee.same_as(&other.notifee)
    }
}

#[derive(Default)]
pub struct ResourceBroker {
    slots: BTreeMap<String, BTreeMap<ComponentId, Option<ResourceValue>>>,
    active: Vec<Subscription>,
    pending: Vec<Subscription>,
}

impl ResourceBroker {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // SLOTS
    // =========================================================================

    /// Create or overwrite a slot. `None` declares it null. Returns the
    /// change to report and the previous value, which the caller drops
    /// outside its locks.
    pub fn declare(
        &mut self,
        name: &str,
        owner: ComponentId,
        value: Option<ResourceValue>,
    ) -> (ResourceChange, Option<ResourceValue>) {
        let change = if value.is_none() {
            ResourceChange::DeclaredNull
        } else if self.exists(name, owner) {
            ResourceChange::Modified
        } else {
            ResourceChange::Created
        };
        let previous = self
            .slots
            .entry(name.to_string())
            .or_default()
            .insert(owner, value)
            .flatten();
        (change, previous)
    }

    /// Value of a slot; `Ok(None)` for a null slot.
    pub fn get(&self, name: &str, owner: ComponentId) -> Result<Option<ResourceValue>, ResourceError> {
        self.slots
            .get(name)
            .and_then(|owners| owners.get(&owner))
            .cloned()
            .ok_or_else(|| ResourceError::NotDeclared {
                name: name.to_string(),
                owner,
            })
    }

    pub fn exists(&self, name: &str, owner: ComponentId) -> bool {
        self.slots
            .get(name)
            .is_some_and(|owners| owners.contains_key(&owner))
    }

    /// Owners declaring `name`, in id order.
    pub fn owners(&self, name: &str) -> Vec<ComponentId> {
        self.slots
            .get(name)
            .map(|owners| owners.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn delete(
        &mut self,
        name: &str,
        owner: ComponentId,
    ) -> Result<Option<ResourceValue>, ResourceError> {
        let owners = self.slots.get_mut(name);
        let removed = owners.and_then(|o| o.remove(&owner)).ok_or_else(|| {
            ResourceError::NotDeclared {
                name: name.to_string(),
                owner,
            }
        })?;
        if self.slots.get(name).is_some_and(BTreeMap::is_empty) {
            self.slots.remove(name);
        }
        Ok(removed)
    }

    /// Remove every slot of `owner`, returning the names and values removed.
    pub fn delete_owned_by(&mut self, owner: ComponentId) -> Vec<(String, Option<ResourceValue>)> {
        let mut removed = Vec::new();
        self.slots.retain(|name, owners| {
            if let Some(value) = owners.remove(&owner) {
                removed.push((name.clone(), value));
            }
            !owners.is_empty()
        });
        removed
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Add a subscription, pending when `deferred`. Repeated requests are
    /// ignored.
    pub fn subscribe(
        &mut self,
        notifee: NotifeeRef,
        name: &str,
        owner: Option<ComponentId>,
        deferred: bool,
    ) {
        let request = Subscription {
            notifee,
            name: name.to_string(),
            owner,
        };
        let known = self
            .active
            .iter()
            .chain(self.pending.iter())
            .any(|s| s.same_request(&request));
        if known {
            return;
        }
        if deferred {
            self.pending.push(request);
        } else {
            self.active.push(request);
        }
    }

    /// Make every pending subscription active. Returns how many moved.
    pub fn activate_pending(&mut self) -> usize {
        let moved = self.pending.len();
        self.active.append(&mut self.pending);
        moved
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Remove one subscription, pending or active.
    pub fn unsubscribe(&mut self, notifee: &NotifeeRef, name: &str, owner: Option<ComponentId>) -> bool {
        let before = self.active.len() + self.pending.len();
        let keep = |s: &Subscription| !(s.name == name && s.owner == owner && s.notifee.same_as(notifee));
        self.active.retain(keep);
        self.pending.retain(keep);
        before != self.active.len() + self.pending.len()
    }

    /// Remove every subscription of a notifee.
    pub fn unsubscribe_all(&mut self, notifee: &NotifeeRef) {
        self.active.retain(|s| !s.notifee.same_as(notifee));
        self.pending.retain(|s| !s.notifee.same_as(notifee));
    }

    /// Active subscribers interested in `(name, owner)`, in subscription
    /// order. Dropped external notifees are pruned.
    pub fn subscribers_for(&mut self, name: &str, owner: ComponentId) -> Vec<NotifeeRef> {
        self.active.retain(|s| !s.notifee.is_dead());
        self.active
            .iter()
            .filter(|s| s.matches(name, owner))
            .map(|s| s.notifee.clone())
            .collect()
    }
}
