//! # CF-02 Component Factory
//!
//! Builds object graphs from a configuration tree. Each group names a
//! registered type in its `type` parameter; resolving the group creates
//! the object, lets it read its parameters and wire its dependencies,
//! and returns it. Later resolutions return the same object.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): no locks, no I/O
//!   - `component`: the `Component` trait and creators
//!   - `registry`: the type catalog and its registration rules
//!   - `description`: per-type parameter documentation
//!   - `lifecycle`: recursion level and configuration queues
//!   - `resources`: named resources and subscriptions
//!
//! - **Ports Layer** (`ports/`): observers, notifees, loader/saver plug-ins
//!
//! - **Adapters Layer** (`adapters/`): file format registry
//!
//! - **Service Layer** (`service/`): `ConfigurationManager`, the locked
//!   facade over all of the above
//!
//! ## Construction Protocol
//!
//! ```text
//! resolve(A) ── create A ── A.configure ── resolve(B) ── create B ── B.configure ── ...
//!     │                                                                     │
//!     └──── post_configure_initialization in configure-completion order ◄───┘
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Single object | A group is bound to at most one object |
//! | Single configure | `configure()` runs at most once per object |
//! | Cycle detection | Re-entering a group under construction fails |
//! | Post-init order | Hooks run after the outermost call, in configure order |
//! | Deferred notifications | Requests made mid-resolution activate at its end |
//! | Top-down destruction | Parents are destroyed before their subgroups |
//!
//! ## Usage
//!
//! ```ignore
//! use cf_02_component_factory::{ConfigurationManager, TypeRegistration, TypeRegistry};
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register(
//!     TypeRegistration::concrete("Motor")
//!         .parent("Component")
//!         .constructor(|ctx| Motor::new(ctx)),
//! )?;
//!
//! let manager = ConfigurationManager::new(registry);
//! manager.create_group("robot/motor")?;
//! manager.set_value("robot/motor/type", "Motor")?;
//! let motor = manager.resolve::<Motor>("robot/motor", true)?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileFormat, FileFormats};
pub use config::FactoryConfig;
pub use domain::component::{
    downcast_handle, AsAny, BoundComponent, Component, ComponentCreator, ComponentHandle,
};
pub use domain::description::{
    ParameterDescription, ParameterKind, ParameterProperties, TypeDescription,
};
pub use domain::registry::{TypeRegistration, TypeRegistry};
pub use domain::resources::ResourceValue;
pub use ports::outbound::{ConfigurationObserver, ParametersLoaderSaver, ResourceChangeNotifee};
pub use service::{ComponentContext, ConfigurationManager, Notifee};

pub use shared_types::{
    ComponentId, ConstructionStatus, FactoryError, LoadSaveError, RegistryError, ResourceChange,
    ResourceError, TreeError, TypeDescriptor, ROOT_COMPONENT_TYPE,
};
