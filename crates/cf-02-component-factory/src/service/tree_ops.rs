//! # Tree API
//!
//! Locked delegation to the configuration tree. Deleting, clearing or
//! renaming groups keeps the bound components consistent.

use super::*;
use cf_01_config_tree::paths::{is_within, join, separate_last_element};
use cf_01_config_tree::{ConfigTree, ParameterStore};
use regex::Regex;
use shared_types::{ConstructionStatus, TreeError};

impl ConfigurationManager {
    // =========================================================================
    // GROUPS
    // =========================================================================

    pub fn create_group(&self, path: &str) -> Result<(), TreeError> {
        self.with_state(|st| st.tree.create_group(path))
    }

    pub fn create_sub_group(&self, parent: &str, name: &str) -> Result<String, TreeError> {
        self.with_state(|st| st.tree.create_sub_group(parent, name))
    }

    pub fn group_exists(&self, path: &str) -> bool {
        self.read_state(|st| st.tree.group_exists(path))
    }

    pub fn canonical_path(&self, path: &str) -> Result<String, TreeError> {
        self.read_state(|st| st.tree.canonical_path(path))
    }

    /// Destroy the components of the subtree, parents first, then remove
    /// the group.
    pub fn delete_group(&self, path: &str) -> Result<(), TreeError> {
        let _guard = self.lock();
        if self.canonical_path(path)?.is_empty() {
            return Err(TreeError::RootNotAllowed);
        }
        self.destroy_subtree(path)?;
        let removed = self.with_state(|st| st.tree.delete_group(path))?;
        drop(removed);
        Ok(())
    }

    /// Rename a group in place. Live components below it follow the move.
    pub fn rename_group(&self, old_path: &str, new_name: &str) -> Result<(), TreeError> {
        self.with_state(|st| {
            let old = st.tree.canonical_path(old_path)?;
            st.tree.rename_group(&old, new_name)?;
            let new = join(separate_last_element(&old).0, new_name);
            for live in st.live.values_mut() {
                if is_within(&live.path, &old) {
                    live.path = format!("{new}{}", &live.path[old.len()..]);
                }
            }
            Ok(())
        })
    }

    /// Copy parameters and subgroups. Objects are not copied.
    pub fn copy_group(&self, src: &str, dst: &str) -> Result<(), TreeError> {
        self.with_state(|st| st.tree.copy_group(src, dst))
    }

    /// Destroy every component, then empty the tree.
    pub fn clear_all(&self) {
        let _guard = self.lock();
        self.destroy_all_components();
        let old = self.with_state(|st| std::mem::take(&mut st.tree));
        drop(old);
    }

    /// Copy of the parameters, without objects.
    pub fn tree_snapshot(&self) -> ConfigTree<()> {
        self.read_state(|st| st.tree.copy_unbound())
    }

    /// Construction status of the group's object.
    pub fn status(&self, path: &str) -> Result<ConstructionStatus, TreeError> {
        self.read_state(|st| Ok(st.tree.slot(path)?.status))
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    pub fn value(&self, path: &str) -> Result<String, TreeError> {
        self.read_state(|st| st.tree.value(path))
    }

    pub fn value_also_match_parents(&self, path: &str) -> Result<String, TreeError> {
        self.read_state(|st| st.tree.value_also_match_parents(path))
    }

    pub fn set_value(&self, path: &str, value: &str) -> Result<(), TreeError> {
        self.with_state(|st| st.tree.set_value(path, value))
    }

    pub fn create_parameter(&self, group: &str, name: &str, value: &str) -> Result<(), TreeError> {
        self.with_state(|st| st.tree.create_parameter(group, name, value))
    }

    pub fn delete_parameter(&self, group: &str, name: &str) -> Result<(), TreeError> {
        self.with_state(|st| st.tree.delete_parameter(group, name))
    }

    pub fn parameter_exists(&self, path: &str) -> bool {
        self.read_state(|st| st.tree.parameter_exists(path))
    }

    // =========================================================================
    // LISTINGS
    // =========================================================================

    pub fn groups_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        self.read_state(|st| st.tree.groups_list(group))
    }

    pub fn groups_with_prefix_list(&self, group: &str, prefix: &str) -> Result<Vec<String>, TreeError> {
        self.read_state(|st| st.tree.groups_with_prefix_list(group, prefix))
    }

    pub fn filtered_groups_list(&self, group: &str, filter: &Regex) -> Result<Vec<String>, TreeError> {
        self.read_state(|st| st.tree.filtered_groups_list(group, filter))
    }

    pub fn parameters_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        self.read_state(|st| st.tree.parameters_list(group))
    }

    pub fn parameters_with_prefix_list(
        &self,
        group: &str,
        prefix: &str,
    ) -> Result<Vec<String>, TreeError> {
        self.read_state(|st| st.tree.parameters_with_prefix_list(group, prefix))
    }

    pub fn filtered_parameters_list(
        &self,
        group: &str,
        filter: &Regex,
    ) -> Result<Vec<String>, TreeError> {
        self.read_state(|st| st.tree.filtered_parameters_list(group, filter))
    }
}

impl ParameterStore for ConfigurationManager {
    fn create_group(&mut self, path: &str) -> Result<(), TreeError> {
        ConfigurationManager::create_group(self, path)
    }

    fn create_parameter(&mut self, group: &str, name: &str, value: &str) -> Result<(), TreeError> {
        ConfigurationManager::create_parameter(self, group, name, value)
    }

    fn set_value(&mut self, path: &str, value: &str) -> Result<(), TreeError> {
        ConfigurationManager::set_value(self, path, value)
    }

    fn group_exists(&self, path: &str) -> bool {
        ConfigurationManager::group_exists(self, path)
    }

    fn groups_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        ConfigurationManager::groups_list(self, group)
    }

    fn parameters_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        ConfigurationManager::parameters_list(self, group)
    }

    fn value(&self, path: &str) -> Result<String, TreeError> {
        ConfigurationManager::value(self, path)
    }
}
