//! # Configuration Manager
//!
//! The service owning one configuration tree together with the objects
//! created from it.
//!
//! ## Architecture
//!
//! This service:
//! 1. Exposes the tree API, with deletions destroying bound components
//! 2. Resolves groups into components (`resolve.rs`), creating and
//!    configuring them on demand
//! 3. Brokers resources and their change notifications (`resources.rs`)
//! 4. Loads and saves parameters through registered file formats
//!
//! ## Locking
//!
//! All state sits behind one reentrant mutex, so a component may call
//! back into the manager from its creator or hooks on the same thread.
//! The inner `RefCell` is only borrowed for short bookkeeping steps and
//! never while user code runs.

mod context;
mod destroy;
mod persistence;
mod resolve;
mod resources;
mod tree_ops;

pub use context::ComponentContext;
pub use resources::Notifee;

use crate::adapters::file_formats::FileFormats;
use crate::config::FactoryConfig;
use crate::domain::component::{BoundComponent, Component, ComponentHandle};
use crate::domain::lifecycle::LifecycleCoordinator;
use crate::domain::registry::TypeRegistry;
use crate::domain::resources::ResourceBroker;
use crate::ports::outbound::ConfigurationObserver;
use cf_01_config_tree::ConfigTree;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use shared_types::{ComponentId, FactoryError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Where a live component sits.
pub(crate) struct LiveComponent {
    pub(crate) path: String,
    pub(crate) handle: Weak<dyn Component>,
}

pub(crate) struct ManagerState {
    pub(crate) tree: ConfigTree<BoundComponent>,
    pub(crate) lifecycle: LifecycleCoordinator,
    pub(crate) resources: ResourceBroker,
    pub(crate) observers: Vec<Weak<dyn ConfigurationObserver>>,
    pub(crate) live: HashMap<ComponentId, LiveComponent>,
    next_id: u64,
}

impl ManagerState {
    fn new(tree: ConfigTree<BoundComponent>) -> Self {
        Self {
            tree,
            lifecycle: LifecycleCoordinator::new(),
            resources: ResourceBroker::new(),
            observers: Vec::new(),
            live: HashMap::new(),
            next_id: 1,
        }
    }

    pub(crate) fn allocate_id(&mut self) -> ComponentId {
        let id = ComponentId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }
}

pub(crate) struct SharedState {
    registry: Arc<TypeRegistry>,
    formats: Arc<FileFormats>,
    config: FactoryConfig,
    state: ReentrantMutex<RefCell<ManagerState>>,
}

impl Drop for SharedState {
    fn drop(&mut self) {
        let observers: Vec<_> = self
            .state
            .get_mut()
            .get_mut()
            .observers
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for observer in observers {
            observer.on_manager_dropped();
        }
    }
}

/// Handle to a configuration tree and the components built from it.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct ConfigurationManager {
    shared: Arc<SharedState>,
}

impl fmt::Debug for ConfigurationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationManager")
            .field("config", &self.shared.config)
            .field("live_components", &self.live_component_count())
            .finish()
    }
}

impl ConfigurationManager {
    /// A manager with default settings and no file formats.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::build(
            registry,
            Arc::new(FileFormats::new()),
            FactoryConfig::default(),
            ConfigTree::new(),
        )
    }

    pub fn with_config(
        registry: Arc<TypeRegistry>,
        formats: Arc<FileFormats>,
        config: FactoryConfig,
    ) -> Result<Self, FactoryError> {
        config.validate()?;
        Ok(Self::build(registry, formats, config, ConfigTree::new()))
    }

    fn build(
        registry: Arc<TypeRegistry>,
        formats: Arc<FileFormats>,
        config: FactoryConfig,
        tree: ConfigTree<BoundComponent>,
    ) -> Self {
        Self {
            shared: Arc::new(SharedState {
                registry,
                formats,
                config,
                state: ReentrantMutex::new(RefCell::new(ManagerState::new(tree))),
            }),
        }
    }

    /// Independent manager with a copy of the parameters and no objects.
    pub fn create_deep_copy(&self) -> Self {
        let tree = self.read_state(|st| st.tree.copy_unbound());
        debug!("[Factory] Configuration manager deep-copied");
        Self::build(
            Arc::clone(&self.shared.registry),
            Arc::clone(&self.shared.formats),
            self.shared.config.clone(),
            tree,
        )
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.shared.registry
    }

    pub fn formats(&self) -> &Arc<FileFormats> {
        &self.shared.formats
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.shared.config
    }

    /// True if both handles address the same state.
    pub fn shares_state_with(&self, other: &ConfigurationManager) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn live_component_count(&self) -> usize {
        self.read_state(|st| st.live.len())
    }

    /// Path of a live component.
    pub fn component_path(&self, id: ComponentId) -> Option<String> {
        self.read_state(|st| st.live.get(&id).map(|l| l.path.clone()))
    }

    /// Live component by id.
    pub fn component(&self, id: ComponentId) -> Option<ComponentHandle> {
        self.read_state(|st| st.live.get(&id).and_then(|l| l.handle.upgrade()))
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    /// Register an observer. It stays registered until removed or dropped.
    pub fn add_observer(&self, observer: &Arc<dyn ConfigurationObserver>) {
        let weak = Arc::downgrade(observer);
        self.with_state(|st| {
            st.observers.retain(|o| o.strong_count() > 0);
            if !st.observers.iter().any(|o| Weak::ptr_eq(o, &weak)) {
                st.observers.push(weak);
            }
        });
    }

    pub fn remove_observer(&self, observer: &Arc<dyn ConfigurationObserver>) {
        let weak = Arc::downgrade(observer);
        self.with_state(|st| st.observers.retain(|o| !Weak::ptr_eq(o, &weak)));
    }

    pub(crate) fn observers(&self) -> Vec<Arc<dyn ConfigurationObserver>> {
        self.with_state(|st| {
            st.observers.retain(|o| o.strong_count() > 0);
            st.observers.iter().filter_map(Weak::upgrade).collect()
        })
    }

    // =========================================================================
    // STATE ACCESS
    // =========================================================================

    /// Hold the manager lock across several steps.
    pub(crate) fn lock(&self) -> ReentrantMutexGuard<'_, RefCell<ManagerState>> {
        self.shared.state.lock()
    }

    /// Mutate the state. `f` must not call user code.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut ManagerState) -> R) -> R {
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    pub(crate) fn read_state<R>(&self, f: impl FnOnce(&ManagerState) -> R) -> R {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        f(&state)
    }
}
