//! Outbound Ports (Driven Ports)
//!
//! Callbacks the factory invokes on code outside it, and the file format
//! plug-in used for loading and saving parameters.

use crate::domain::component::ComponentHandle;
use cf_01_config_tree::ParameterStore;
use shared_types::{ComponentId, LoadSaveError, ResourceChange};
use std::io::{BufRead, Write};

/// Watches component creation and destruction.
///
/// Observers are held weakly: dropping the last `Arc` unregisters them.
pub trait ConfigurationObserver: Send + Sync {
    fn on_component_creation(&self, _path: &str, _component: &ComponentHandle) {}

    fn on_component_destruction(&self, _path: &str, _component: &ComponentHandle) {}

    /// The manager this observer was registered with is gone.
    fn on_manager_dropped(&self) {}
}

/// Receives resource change notifications outside of components.
pub trait ResourceChangeNotifee: Send + Sync {
    fn resource_changed(&self, name: &str, owner: ComponentId, change: ResourceChange);
}

/// Reads and writes the flat parameter model in one file format.
pub trait ParametersLoaderSaver: Send + Sync {
    fn load(&self, input: &mut dyn BufRead, store: &mut dyn ParameterStore)
        -> Result<(), LoadSaveError>;

    fn save(&self, output: &mut dyn Write, store: &dyn ParameterStore) -> Result<(), LoadSaveError>;
}
