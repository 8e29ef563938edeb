//! Inbound Ports (Driving Ports)
//!
//! File loaders and savers only see the flat `(group path, parameter name,
//! string value)` model through [`ParameterStore`]. Both the bare
//! [`ConfigTree`] and the locked configuration manager implement it.

use crate::domain::path::join;
use crate::domain::tree::ConfigTree;
use shared_types::TreeError;

/// Tree operations available to loaders and savers.
pub trait ParameterStore {
    fn create_group(&mut self, path: &str) -> Result<(), TreeError>;

    fn create_parameter(&mut self, group: &str, name: &str, value: &str) -> Result<(), TreeError>;

    fn set_value(&mut self, path: &str, value: &str) -> Result<(), TreeError>;

    fn group_exists(&self, path: &str) -> bool;

    fn groups_list(&self, group: &str) -> Result<Vec<String>, TreeError>;

    fn parameters_list(&self, group: &str) -> Result<Vec<String>, TreeError>;

    fn value(&self, path: &str) -> Result<String, TreeError>;
}

impl<B> ParameterStore for ConfigTree<B> {
    fn create_group(&mut self, path: &str) -> Result<(), TreeError> {
        ConfigTree::create_group(self, path)
    }

    fn create_parameter(&mut self, group: &str, name: &str, value: &str) -> Result<(), TreeError> {
        ConfigTree::create_parameter(self, group, name, value)
    }

    fn set_value(&mut self, path: &str, value: &str) -> Result<(), TreeError> {
        ConfigTree::set_value(self, path, value)
    }

    fn group_exists(&self, path: &str) -> bool {
        ConfigTree::group_exists(self, path)
    }

    fn groups_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        ConfigTree::groups_list(self, group)
    }

    fn parameters_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        ConfigTree::parameters_list(self, group)
    }

    fn value(&self, path: &str) -> Result<String, TreeError> {
        ConfigTree::value(self, path)
    }
}

/// Visit every `(group, name, value)` triple below `group`, parameters of a
/// group before its subgroups, everything in key order.
pub fn for_each_parameter<S, F>(store: &S, group: &str, visit: &mut F) -> Result<(), TreeError>
where
    S: ParameterStore + ?Sized,
    F: FnMut(&str, &str, &str),
{
    for name in store.parameters_list(group)? {
        let value = store.value(&join(group, &name))?;
        visit(group, &name, &value);
    }
    for child in store.groups_list(group)? {
        for_each_parameter(store, &join(group, &child), visit)?;
    }
    Ok(())
}
