//! # Error Types
//!
//! Error taxonomy of the configuration tree, the type registry, the
//! resource broker and the component factory. Every variant is fatal to the
//! current call; nothing here is retried internally.

use crate::entities::{ComponentId, ConstructionStatus};
use thiserror::Error;

/// Errors raised by configuration tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A group on the path does not exist.
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    /// The path is malformed for the requested operation.
    #[error("Invalid path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The destination group already exists.
    #[error("Group already exists: {path}")]
    AlreadyExists { path: String },

    /// No parameter with that name exists.
    #[error("Parameter not found: {path}")]
    ParameterNotFound { path: String },

    /// The root group can not be copied or renamed.
    #[error("Operation not allowed on the root group")]
    RootNotAllowed,

    /// A construction status change outside the legal transition graph.
    #[error("Illegal status transition for {path}: {from} -> {to}")]
    IllegalTransition {
        path: String,
        from: ConstructionStatus,
        to: ConstructionStatus,
    },
}

/// Errors raised by the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A named parent was never registered.
    #[error("Cannot register type {type_name}: ancestor {ancestor} is not registered")]
    AncestorNotRegistered { type_name: String, ancestor: String },

    /// A second registration differs from the first one.
    #[error("Cannot re-register type {type_name}: {reason}")]
    CannotReRegisterType {
        type_name: String,
        reason: &'static str,
    },

    /// A component type with no component ancestor.
    #[error("Type {type_name} has no parent component")]
    ComponentHasNoParentComponent { type_name: String },

    /// Constructor configuration requested under a parent that configures later.
    #[error(
        "Type {type_name} configures in constructor but ancestor {ancestor} configures in configure()"
    )]
    IncompatibleConfigurationStrategies { type_name: String, ancestor: String },

    /// No type with that name.
    #[error("Class name not registered: {0}")]
    ClassNameNotRegistered(String),

    /// The type exists but can not be instantiated.
    #[error("Class name is abstract: {0}")]
    ClassNameIsAbstract(String),
}

/// Errors raised by resource lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// No (name, owner) slot.
    #[error("Resource {name} not declared by {owner}")]
    NotDeclared { name: String, owner: ComponentId },

    /// No owner at all declares the name.
    #[error("Resource {name} not declared by any component")]
    NotFound { name: String },

    /// Several owners are equally near the requester.
    #[error("Resource {name} is ambiguous: {candidates} owners at the same distance")]
    Ambiguous { name: String, candidates: usize },

    /// The stored value has another type.
    #[error("Resource {name} is not a {requested}")]
    WrongType {
        name: String,
        requested: &'static str,
    },
}

/// Errors raised by the component factory.
#[derive(Debug, Clone, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The object bound to the group is not the requested Rust type.
    #[error("Cannot convert object of type {type_name} to {requested}")]
    CannotConvertToType {
        type_name: String,
        requested: &'static str,
    },

    /// The group re-entered itself while being created or configured.
    #[error("Cyclic dependency while resolving {path}")]
    CyclicDependency { path: String },

    /// Nested resolution went deeper than the configured limit.
    #[error("Recursion limit {limit} exceeded while resolving {path}")]
    RecursionLimit { path: String, limit: usize },

    /// Raised by a component from its creator, `configure` or
    /// post-configure hook.
    #[error("Component at {path} failed: {reason}")]
    ComponentFailure { path: String, reason: String },

    /// Rejected factory configuration.
    #[error("Invalid factory configuration: {0}")]
    InvalidConfig(String),

    /// Broken bookkeeping; indicates a bug, never a configuration error.
    #[error("Internal factory error: {0}")]
    Internal(String),
}

impl FactoryError {
    /// Shorthand for component-raised failures.
    pub fn component(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FactoryError::ComponentFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True if this error reports a construction cycle.
    pub fn is_cyclic_dependency(&self) -> bool {
        matches!(self, FactoryError::CyclicDependency { .. })
    }
}

/// Errors raised while loading or saving parameters.
#[derive(Debug, Error)]
pub enum LoadSaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),

    /// No format name given and none could be guessed from the filename.
    #[error("Unknown file format for {filename}")]
    UnknownFormat { filename: String },

    /// The loader rejected the input.
    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
