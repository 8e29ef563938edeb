//! Component capabilities and creators.

use crate::service::ComponentContext;
use shared_types::{ComponentId, FactoryError, ResourceChange};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Upcasting to `Any`, implemented for every `Send + Sync` type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Rust type name of the concrete object.
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An object the factory can create from a configuration group.
///
/// Every hook has a default, so a type only implements what it uses.
/// Components use interior mutability for state set during `configure`.
pub trait Component: AsAny {
    /// Read parameters and wire dependencies. Runs at most once.
    fn configure(&self, _ctx: &ComponentContext) -> Result<(), FactoryError> {
        Ok(())
    }

    /// Runs once per outermost resolution, after every component touched
    /// by it is configured, in configuration order.
    fn post_configure_initialization(&self, _ctx: &ComponentContext) -> Result<(), FactoryError> {
        Ok(())
    }

    /// A watched resource changed.
    fn resource_changed(&self, _name: &str, _owner: ComponentId, _change: ResourceChange) {}

    /// The component is being removed from its group.
    fn on_destroy(&self) {}
}

/// Shared handle to a created component.
pub type ComponentHandle = Arc<dyn Component>;

/// Concrete object behind a handle, if it is a `T`.
pub fn downcast_handle<T: Any + Send + Sync>(handle: &ComponentHandle) -> Option<Arc<T>> {
    Arc::clone(handle).as_any_arc().downcast::<T>().ok()
}

/// What a configuration group is bound to once created.
#[derive(Clone)]
pub struct BoundComponent {
    pub id: ComponentId,
    pub type_name: String,
    pub handle: ComponentHandle,
}

impl fmt::Debug for BoundComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundComponent")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("concrete", &(*self.handle).concrete_type_name())
            .finish()
    }
}

/// Creates instances of one registered type.
pub trait ComponentCreator: Send + Sync {
    fn create(&self, ctx: &ComponentContext) -> Result<ComponentHandle, FactoryError>;
}

impl<F> ComponentCreator for F
where
    F: Fn(&ComponentContext) -> Result<ComponentHandle, FactoryError> + Send + Sync,
{
    fn create(&self, ctx: &ComponentContext) -> Result<ComponentHandle, FactoryError> {
        self(ctx)
    }
}
