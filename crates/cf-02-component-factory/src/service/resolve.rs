//! # Resolution
//!
//! Turns a group into its object, creating and configuring it on demand.
//!
//! ## Protocol
//!
//! - The outermost call always configures, and starts with empty queues
//! - Every call enters one recursion level
//! - An object created with `configure == false` is queued with the level
//!   it was created at; when a call releases its level, every queued
//!   object created deeper is configured, most recent first
//! - Finished configurations are queued in completion order; once the
//!   outermost call has released its level, their post-configure hooks
//!   run in that order, then queued notification requests become active
//! - Re-entering a group being created, or being configured when
//!   configuration is requested, is a cyclic dependency
//!
//! ## Failures
//!
//! An object whose `configure()` fails is destroyed and its group reset,
//! wherever that configuration ran. A call that fails after its own object
//! was built, while flushing deferred configurations or running
//! post-configure hooks, destroys the object it created as well. Objects
//! created by nested calls that succeeded stay created; objects still
//! queued for configuration below the failing level are left unconfigured
//! and get configured the next time they are resolved with
//! `configure == true`.

use super::*;
use crate::domain::component::{downcast_handle, AsAny};
use crate::domain::lifecycle::PendingComponent;
use crate::domain::resources::NotifeeRef;
use cf_01_config_tree::paths::{join, last_element, separate_last_element, GROUP_SEPARATOR};
use cf_telemetry::log_component_event;
use cf_telemetry::metrics::{
    HistogramTimer, COMPONENTS_CONFIGURED, COMPONENTS_CREATED, CYCLIC_DEPENDENCIES,
    LIVE_COMPONENTS, RESOLVE_DURATION,
};
use shared_types::{ConstructionStatus, RegistryError, ResourceChange, TreeError};
use std::any::Any;
use tracing::{debug, warn};

/// Object handed back by one call, and the one it created if any.
struct Resolved {
    handle: ComponentHandle,
    created: Option<(String, BoundComponent)>,
}

impl Resolved {
    fn existing(bound: BoundComponent) -> Self {
        Self {
            handle: bound.handle,
            created: None,
        }
    }
}

/// The Rust type a caller asks for.
struct Expected<'a> {
    accepts: &'a dyn Fn(&dyn Component) -> bool,
    name: &'static str,
}

impl Expected<'_> {
    fn check(&self, bound: &BoundComponent) -> Result<(), FactoryError> {
        if (self.accepts)(&*bound.handle) {
            Ok(())
        } else {
            Err(FactoryError::CannotConvertToType {
                type_name: bound.type_name.clone(),
                requested: self.name,
            })
        }
    }
}

impl ConfigurationManager {
    // =========================================================================
    // PUBLIC API
    // =========================================================================

    /// Object of `group` as a `T`.
    ///
    /// `configure == false` is a hint that the caller does not need the
    /// object configured yet; it is ignored by the outermost call.
    pub fn resolve<T: Any + Send + Sync>(
        &self,
        group: &str,
        configure: bool,
    ) -> Result<Arc<T>, FactoryError> {
        let accepts = |c: &dyn Component| AsAny::as_any(c).is::<T>();
        let expected = Expected {
            accepts: &accepts,
            name: std::any::type_name::<T>(),
        };
        let handle = self.resolve_checked(group, configure, &expected)?;
        downcast_handle::<T>(&handle)
            .ok_or_else(|| FactoryError::Internal(format!("object of {group} changed type")))
    }

    /// Object of `group`, whatever its Rust type.
    pub fn resolve_dyn(&self, group: &str, configure: bool) -> Result<ComponentHandle, FactoryError> {
        let accepts = |_: &dyn Component| true;
        let expected = Expected {
            accepts: &accepts,
            name: "dyn Component",
        };
        self.resolve_checked(group, configure, &expected)
    }

    /// Object of the group named by the parameter at `param_path`.
    ///
    /// A relative value is taken from the parameter's own group; a value
    /// starting with `/` is taken from the root.
    pub fn resolve_from_parameter<T: Any + Send + Sync>(
        &self,
        param_path: &str,
        configure: bool,
    ) -> Result<Arc<T>, FactoryError> {
        let target = self.parameter_target(param_path)?;
        self.resolve::<T>(&target, configure)
    }

    pub fn resolve_dyn_from_parameter(
        &self,
        param_path: &str,
        configure: bool,
    ) -> Result<ComponentHandle, FactoryError> {
        let target = self.parameter_target(param_path)?;
        self.resolve_dyn(&target, configure)
    }

    fn parameter_target(&self, param_path: &str) -> Result<String, TreeError> {
        let value = self.value(param_path)?;
        if value.starts_with(GROUP_SEPARATOR) {
            Ok(value)
        } else {
            Ok(join(separate_last_element(param_path).0, &value))
        }
    }

    // =========================================================================
    // PASSES AND LEVELS
    // =========================================================================

    fn resolve_checked(
        &self,
        group: &str,
        configure: bool,
        expected: &Expected<'_>,
    ) -> Result<ComponentHandle, FactoryError> {
        let _guard = self.lock();
        let outermost = self.read_state(|st| st.lifecycle.is_idle());
        let _timer = outermost.then(|| HistogramTimer::new(&RESOLVE_DURATION));
        let configure = if outermost {
            self.with_state(|st| st.lifecycle.begin_pass());
            true
        } else {
            configure
        };

        let scope = RecursionScope::enter(self);
        let limit = self.shared.config.max_recursion_depth;
        if scope.level() > limit {
            warn!(path = %group, limit, "[Factory] Recursion limit exceeded");
            return Err(FactoryError::RecursionLimit {
                path: group.to_string(),
                limit,
            });
        }
        let resolved = self.resolve_at_level(group, configure, expected, scope.level())?;
        let finished = scope.release().and_then(|()| {
            if outermost {
                self.finish_pass()
            } else {
                Ok(())
            }
        });

        if let Err(e) = finished {
            if let Some((path, bound)) = &resolved.created {
                self.roll_back(path, bound);
            }
            return Err(e);
        }
        Ok(resolved.handle)
    }

    fn finish_pass(&self) -> Result<(), FactoryError> {
        let configured = self.with_state(|st| st.lifecycle.take_configured());
        let leftover = self.read_state(|st| st.lifecycle.deferred_len());
        if leftover > 0 {
            return Err(FactoryError::Internal(format!(
                "{leftover} components still queued for configuration"
            )));
        }

        for pending in &configured {
            let ctx = self.context_for(&pending.path, &pending.bound);
            pending.bound.handle.post_configure_initialization(&ctx)?;
        }
        let activated = self.with_state(|st| st.resources.activate_pending());
        debug!(
            initialized = configured.len(),
            subscriptions = activated,
            "[Factory] Resolution pass finished"
        );
        Ok(())
    }

    // =========================================================================
    // ONE GROUP
    // =========================================================================

    fn resolve_at_level(
        &self,
        group: &str,
        configure: bool,
        expected: &Expected<'_>,
        level: usize,
    ) -> Result<Resolved, FactoryError> {
        let (path, slot) = self.read_state(|st| -> Result<_, TreeError> {
            let path = st.tree.canonical_path(group)?;
            let slot = st.tree.slot(&path)?.clone();
            Ok((path, slot))
        })?;

        match slot.status {
            ConstructionStatus::NotCreated => self.create_component(&path, configure, expected, level),
            ConstructionStatus::Creating => Err(self.cycle(&path)),
            ConstructionStatus::Configuring if configure => Err(self.cycle(&path)),
            ConstructionStatus::CreatedNotConfigured if configure => {
                let bound = bound_object(&path, slot.object)?;
                expected.check(&bound)?;
                self.with_state(|st| st.lifecycle.remove_deferred(bound.id));
                self.configure_component(&path, &bound)?;
                Ok(Resolved::existing(bound))
            }
            ConstructionStatus::CreatedNotConfigured
            | ConstructionStatus::Configuring
            | ConstructionStatus::CreatedAndConfigured => {
                let bound = bound_object(&path, slot.object)?;
                expected.check(&bound)?;
                Ok(Resolved::existing(bound))
            }
        }
    }

    fn create_component(
        &self,
        path: &str,
        configure: bool,
        expected: &Expected<'_>,
        level: usize,
    ) -> Result<Resolved, FactoryError> {
        let type_name = self.value(&join(path, &self.shared.config.type_parameter))?;
        let descriptor = self.shared.registry.type_info(&type_name)?;
        if !descriptor.can_be_created {
            return Err(RegistryError::ClassNameIsAbstract(type_name).into());
        }
        let creator = self.shared.registry.get_creator(&type_name)?;

        let id = self.with_state(|st| -> Result<ComponentId, TreeError> {
            st.tree.set_status(path, ConstructionStatus::Creating)?;
            Ok(st.allocate_id())
        })?;
        debug!(path = %path, type_name = %type_name, id = %id, "[Factory] Creating component");

        let ctx = ComponentContext::new(self.clone(), path, type_name.as_str(), id);
        let handle = match creator.create(&ctx) {
            Ok(handle) => handle,
            Err(e) => {
                self.discard_unbound(path, id);
                return Err(e);
            }
        };
        let bound = BoundComponent {
            id,
            type_name,
            handle: Arc::clone(&handle),
        };
        if let Err(e) = expected.check(&bound) {
            self.discard_unbound(path, id);
            return Err(e);
        }

        let status = if descriptor.configures_in_constructor {
            ConstructionStatus::CreatedAndConfigured
        } else {
            ConstructionStatus::CreatedNotConfigured
        };
        let bound_result = self.with_state(|st| -> Result<(), TreeError> {
            st.tree.bind(path, status, bound.clone())?;
            st.live.insert(
                id,
                LiveComponent {
                    path: path.to_string(),
                    handle: Arc::downgrade(&handle),
                },
            );
            Ok(())
        });
        if let Err(e) = bound_result {
            self.discard_unbound(path, id);
            return Err(e.into());
        }
        self.announce_creation(path, &bound);

        let pending = PendingComponent {
            path: path.to_string(),
            bound: bound.clone(),
        };
        if descriptor.configures_in_constructor {
            COMPONENTS_CONFIGURED.inc();
            self.with_state(|st| st.lifecycle.push_configured(pending));
        } else if configure {
            self.configure_component(path, &bound)?;
        } else {
            self.with_state(|st| st.lifecycle.defer_configure(pending, level));
        }
        Ok(Resolved {
            handle,
            created: Some((path.to_string(), bound)),
        })
    }

    fn announce_creation(&self, path: &str, bound: &BoundComponent) {
        COMPONENTS_CREATED.inc();
        LIVE_COMPONENTS.inc();
        log_component_event!(
            debug,
            "[Factory] Component created",
            path = %path,
            type_name = %bound.type_name,
            id = %bound.id
        );
        for observer in self.observers() {
            observer.on_component_creation(path, &bound.handle);
        }
        let own_name = last_element(path);
        if !own_name.is_empty() {
            let value = Arc::clone(&bound.handle).as_any_arc();
            self.declare_resource(own_name, bound.id, Some(value));
        }
    }

    pub(crate) fn configure_component(
        &self,
        path: &str,
        bound: &BoundComponent,
    ) -> Result<(), FactoryError> {
        self.with_state(|st| st.tree.set_status(path, ConstructionStatus::Configuring))?;
        let ctx = self.context_for(path, bound);
        if let Err(e) = bound.handle.configure(&ctx) {
            warn!(path = %path, error = %e, "[Factory] Configuration failed, destroying component");
            self.destroy_single(path, bound);
            return Err(e);
        }
        self.with_state(|st| -> Result<(), TreeError> {
            st.tree
                .set_status(path, ConstructionStatus::CreatedAndConfigured)?;
            st.lifecycle.push_configured(PendingComponent {
                path: path.to_string(),
                bound: bound.clone(),
            });
            Ok(())
        })?;
        COMPONENTS_CONFIGURED.inc();
        log_component_event!(
            debug,
            "[Factory] Component configured",
            path = %path,
            type_name = %bound.type_name
        );
        Ok(())
    }

    fn context_for(&self, path: &str, bound: &BoundComponent) -> ComponentContext {
        ComponentContext::new(self.clone(), path, bound.type_name.as_str(), bound.id)
    }

    fn cycle(&self, path: &str) -> FactoryError {
        CYCLIC_DEPENDENCIES.inc();
        warn!(path = %path, "[Factory] Cyclic dependency detected");
        FactoryError::CyclicDependency {
            path: path.to_string(),
        }
    }

    /// Destroy the object a failing call created, unless something already
    /// replaced or removed it.
    fn roll_back(&self, path: &str, bound: &BoundComponent) {
        let still_bound = self.read_state(|st| {
            st.tree
                .slot(path)
                .ok()
                .and_then(|slot| slot.object.as_ref().map(|o| o.id))
                == Some(bound.id)
        });
        if still_bound {
            warn!(path = %path, "[Factory] Resolution failed, destroying created component");
            self.destroy_single(path, bound);
        }
    }

    /// Reset a group whose object never got bound, dropping whatever its
    /// creator declared or subscribed to.
    fn discard_unbound(&self, path: &str, id: ComponentId) {
        let removed = self.with_state(|st| {
            if let Err(e) = st.tree.unbind(path) {
                warn!(path = %path, error = %e, "[Factory] Group vanished during creation");
            }
            st.resources.unsubscribe_all(&NotifeeRef::Component(id));
            st.resources.delete_owned_by(id)
        });
        for (name, _) in &removed {
            self.notify_resource_change(name, id, ResourceChange::Deleted);
        }
    }
}

fn bound_object(
    path: &str,
    object: Option<BoundComponent>,
) -> Result<BoundComponent, FactoryError> {
    object.ok_or_else(|| FactoryError::Internal(format!("group {path} has a status but no object")))
}

/// One entered recursion level. Releasing configures what nested calls
/// left queued; dropping without release only discards it.
struct RecursionScope<'a> {
    manager: &'a ConfigurationManager,
    level: usize,
    released: bool,
}

impl<'a> RecursionScope<'a> {
    fn enter(manager: &'a ConfigurationManager) -> Self {
        let level = manager.with_state(|st| st.lifecycle.enter());
        Self {
            manager,
            level,
            released: false,
        }
    }

    fn level(&self) -> usize {
        self.level
    }

    fn release(mut self) -> Result<(), FactoryError> {
        let level = self.level;
        while let Some(pending) = self
            .manager
            .with_state(|st| st.lifecycle.pop_deeper_than(level))
        {
            self.manager
                .configure_component(&pending.path, &pending.bound)?;
        }
        self.released = true;
        self.manager.with_state(|st| st.lifecycle.leave());
        Ok(())
    }
}

impl Drop for RecursionScope<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let level = self.level;
        let discarded = self.manager.with_state(|st| {
            let discarded = st.lifecycle.discard_deeper_than(level);
            st.lifecycle.leave();
            discarded
        });
        if discarded > 0 {
            debug!(discarded, level, "[Factory] Queued configurations dropped after failure");
        }
    }
}
