//! Domain layer: keys, paths, nodes and the tree.

pub mod key;
pub mod node;
pub mod path;
pub mod tree;
