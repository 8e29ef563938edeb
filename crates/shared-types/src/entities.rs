//! # Core Domain Entities
//!
//! Defines the entities shared by the configuration tree and the component
//! factory.
//!
//! ## Clusters
//!
//! - **Identity**: `ComponentId`
//! - **Lifecycle**: `ConstructionStatus`
//! - **Type graph**: `TypeDescriptor`
//! - **Resources**: `ResourceChange`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Identity of a live component, unique within one configuration manager.
///
/// Ids are never reused while the manager lives, so a stale id can not
/// address a component created later in the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Wrap a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

// =============================================================================
// CLUSTER B: LIFECYCLE
// =============================================================================

/// Construction status of the object bound to a configuration node.
///
/// Legal forward paths:
///
/// ```text
/// NotCreated -> Creating -> CreatedAndConfigured
/// NotCreated -> Creating -> CreatedNotConfigured -> Configuring -> CreatedAndConfigured
/// ```
///
/// Any status may fall back to `NotCreated` when the bound object is
/// destroyed or a failed creation is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConstructionStatus {
    /// No object bound to the node.
    #[default]
    NotCreated,
    /// The creator is running higher on the call stack.
    Creating,
    /// The object exists but `configure()` has not run yet.
    CreatedNotConfigured,
    /// `configure()` is running higher on the call stack.
    Configuring,
    /// The object is fully built.
    CreatedAndConfigured,
}

impl ConstructionStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ConstructionStatus) -> bool {
        use ConstructionStatus::*;
        matches!(
            (self, next),
            (_, NotCreated)
                | (NotCreated, Creating)
                | (Creating, CreatedAndConfigured)
                | (Creating, CreatedNotConfigured)
                | (CreatedNotConfigured, Configuring)
                | (Configuring, CreatedAndConfigured)
        )
    }

    /// Whether an object instance exists for this status.
    pub fn has_object(self) -> bool {
        matches!(
            self,
            ConstructionStatus::CreatedNotConfigured
                | ConstructionStatus::Configuring
                | ConstructionStatus::CreatedAndConfigured
        )
    }

    /// Short name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ConstructionStatus::NotCreated => "not_created",
            ConstructionStatus::Creating => "creating",
            ConstructionStatus::CreatedNotConfigured => "created_not_configured",
            ConstructionStatus::Configuring => "configuring",
            ConstructionStatus::CreatedAndConfigured => "created_and_configured",
        }
    }
}

impl fmt::Display for ConstructionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLUSTER C: TYPE GRAPH
// =============================================================================

/// Name of the root type every component type descends from.
pub const ROOT_COMPONENT_TYPE: &str = "Component";

/// Immutable description of a registered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Registered type name.
    pub name: String,
    /// Direct parents, in registration order.
    pub parents: Vec<String>,
    /// Interfaces are not components themselves and may have no parents.
    pub is_interface: bool,
    /// False for abstract types and interfaces.
    pub can_be_created: bool,
    /// True if the creator fully configures the object, so `configure()`
    /// is never called.
    pub configures_in_constructor: bool,
}

impl TypeDescriptor {
    /// A concrete type that configures in `configure()`, with no parents yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            is_interface: false,
            can_be_created: true,
            configures_in_constructor: false,
        }
    }

    /// Add a direct parent.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Mark the type as abstract (registered but not creatable).
    pub fn abstract_type(mut self) -> Self {
        self.can_be_created = false;
        self
    }

    /// Mark the type as an interface. Interfaces are never creatable.
    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self.can_be_created = false;
        self
    }

    /// Set the configuration strategy.
    pub fn configures_in_constructor(mut self, value: bool) -> Self {
        self.configures_in_constructor = value;
        self
    }
}

// =============================================================================
// CLUSTER D: RESOURCES
// =============================================================================

/// Kind of change reported to resource subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceChange {
    /// First declaration of a (name, owner) slot with a value.
    Created,
    /// A new value replaced an existing slot.
    Modified,
    /// The slot is declared but holds no value.
    DeclaredNull,
    /// The slot was removed.
    Deleted,
}

impl ResourceChange {
    /// Label used for metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceChange::Created => "created",
            ResourceChange::Modified => "modified",
            ResourceChange::DeclaredNull => "declared_null",
            ResourceChange::Deleted => "deleted",
        }
    }
}
