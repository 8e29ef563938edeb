//! Per-component view of the manager.

use super::resources::Notifee;
use super::ConfigurationManager;
use crate::domain::component::ComponentHandle;
use crate::domain::resources::ResourceValue;
use cf_01_config_tree::paths::{join, last_element};
use shared_types::{ComponentId, FactoryError, ResourceError, TreeError};
use std::any::Any;
use std::sync::Arc;

/// Handed to creators and component hooks: the group being built and a
/// handle back to the manager.
#[derive(Clone)]
pub struct ComponentContext {
    manager: ConfigurationManager,
    path: String,
    type_name: String,
    id: ComponentId,
}

impl ComponentContext {
    pub(crate) fn new(
        manager: ConfigurationManager,
        path: impl Into<String>,
        type_name: impl Into<String>,
        id: ComponentId,
    ) -> Self {
        Self {
            manager,
            path: path.into(),
            type_name: type_name.into(),
            id,
        }
    }

    pub fn manager(&self) -> &ConfigurationManager {
        &self.manager
    }

    /// Canonical path of the component's group.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last element of the group path, also the name of the component's
    /// own resource.
    pub fn group_name(&self) -> &str {
        last_element(&self.path)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Shorthand for a component failure at this group.
    pub fn failure(&self, reason: impl Into<String>) -> FactoryError {
        FactoryError::component(self.path.clone(), reason)
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    /// Raw string value of a parameter of this group.
    pub fn value(&self, name: &str) -> Result<String, TreeError> {
        self.manager.value(&join(&self.path, name))
    }

    pub fn value_or(&self, name: &str, default: &str) -> String {
        self.value(name).unwrap_or_else(|_| default.to_string())
    }

    /// Value of a parameter of this group or of the nearest ancestor
    /// group defining it.
    pub fn inherited_value(&self, name: &str) -> Result<String, TreeError> {
        self.manager.value_also_match_parents(&join(&self.path, name))
    }

    pub fn sub_groups(&self) -> Result<Vec<String>, TreeError> {
        self.manager.groups_list(&self.path)
    }

    // =========================================================================
    // DEPENDENCIES
    // =========================================================================

    /// Object of a subgroup of this group.
    pub fn resolve_subgroup<T: Any + Send + Sync>(
        &self,
        name: &str,
        configure: bool,
    ) -> Result<Arc<T>, FactoryError> {
        self.manager.resolve::<T>(&join(&self.path, name), configure)
    }

    pub fn resolve_dyn_subgroup(
        &self,
        name: &str,
        configure: bool,
    ) -> Result<ComponentHandle, FactoryError> {
        self.manager.resolve_dyn(&join(&self.path, name), configure)
    }

    /// Object of the group named by one of this group's parameters.
    pub fn resolve_from_parameter<T: Any + Send + Sync>(
        &self,
        name: &str,
        configure: bool,
    ) -> Result<Arc<T>, FactoryError> {
        self.manager
            .resolve_from_parameter::<T>(&join(&self.path, name), configure)
    }

    // =========================================================================
    // RESOURCES
    // =========================================================================

    /// Publish a resource owned by this component.
    pub fn declare_resource<V: Any + Send + Sync>(&self, name: &str, value: Arc<V>) {
        self.manager
            .declare_resource(name, self.id, Some(value as ResourceValue));
    }

    pub fn declare_null_resource(&self, name: &str) {
        self.manager.declare_resource(name, self.id, None);
    }

    pub fn delete_resource(&self, name: &str) -> Result<(), ResourceError> {
        self.manager.delete_resource(name, self.id)
    }

    pub fn resource<T: Any + Send + Sync>(
        &self,
        name: &str,
        owner: ComponentId,
    ) -> Result<Option<Arc<T>>, ResourceError> {
        self.manager.resource::<T>(name, owner)
    }

    /// Resource declared by the owner nearest to this group.
    pub fn nearest_resource<T: Any + Send + Sync>(
        &self,
        name: &str,
    ) -> Result<(ComponentId, Option<Arc<T>>), ResourceError> {
        self.manager.nearest_resource::<T>(name, &self.path)
    }

    /// Watch `name`, from one owner or from any. Requests made during a
    /// resolution take effect when the outermost resolution returns.
    pub fn request_notification(&self, name: &str, owner: Option<ComponentId>) {
        self.manager
            .request_notification(Notifee::Component(self.id), name, owner);
    }

    pub fn remove_notification(&self, name: &str, owner: Option<ComponentId>) -> bool {
        self.manager
            .remove_notification(&Notifee::Component(self.id), name, owner)
    }
}
