//! Cross-crate integration tests.

pub mod fixtures;

mod construction_order;
mod persistence;
mod registry;
mod threads;
mod tree_properties;
