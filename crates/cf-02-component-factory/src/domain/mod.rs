//! Domain layer: component capabilities, the type registry, lifecycle
//! bookkeeping and the resource broker. No locking and no I/O here.

pub mod component;
pub mod description;
pub mod lifecycle;
pub mod registry;
pub mod resources;
