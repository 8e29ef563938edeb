//! # CF-01 Config Tree
//!
//! Hierarchical store of groups and string parameters, addressed by
//! `/`-separated paths.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure data structures, no I/O
//!   - `ConfigKey`: numeric-aware key ordering (`p:3` == `p:03` < `p:12`)
//!   - `path`: path grammar helpers (`..`, separators, tree distance)
//!   - `ConfigNode`: a group with children, parameters and a component slot
//!   - `ConfigTree`: every path-based operation
//!
//! - **Ports Layer** (`ports/`): trait definitions
//!   - `ParameterStore`: what file loaders and savers drive
//!
//! ## Path Grammar
//!
//! - Segments are separated by `/`, empty segments are skipped on lookup
//! - `..` is the parent group; the root is its own parent
//! - The root group is the empty string `""`
//! - Names must not contain `/` and must not be `..`
//!
//! ## Invariants
//!
//! - At most one bound object per node
//! - Slot statuses only move along the legal construction paths, or back
//!   to `NotCreated` when the object is unbound
//!
//! ## Usage Example
//!
//! ```ignore
//! use cf_01_config_tree::ConfigTree;
//!
//! let mut tree: ConfigTree<()> = ConfigTree::new();
//! tree.create_group("robot/arm:2")?;
//! tree.set_value("robot/arm:2/type", "Arm")?;
//! assert_eq!(tree.value("robot/arm:02/type")?, "Arm");
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;

pub use domain::key::ConfigKey;
pub use domain::node::{ComponentSlot, ConfigNode};
pub use domain::path::{self as paths, GROUP_SEPARATOR, PARENT_GROUP};
pub use domain::tree::ConfigTree;
pub use ports::inbound::{for_each_parameter, ParameterStore};
pub use shared_types::{ConstructionStatus, TreeError};
