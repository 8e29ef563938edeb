//! # Shared Types Crate
//!
//! Entities and errors used across the Component Forge crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: statuses, descriptors and the error taxonomy
//!   are defined once here and re-exported by the other workspace crates.
//! - **Strings at the boundary**: parameter values are always strings; no
//!   type coercion happens in this layer.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
