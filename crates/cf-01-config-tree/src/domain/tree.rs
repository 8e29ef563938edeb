//! The configuration tree
//!
//! Every operation takes a path relative to the root. Lookups are lenient
//! (empty segments are skipped, so `"a//b/"` finds `a/b`); creation paths are
//! strict (see [`validate_creation_path`]).

use super::key::same_key;
use super::node::{ComponentSlot, ConfigNode};
use super::path::{
    join, segments, separate_last_element, validate_creation_path, validate_name, PARENT_GROUP,
};
use regex::Regex;
use shared_types::{ConstructionStatus, TreeError};
use tracing::debug;

/// Ordered, path-addressable store of groups and string parameters.
#[derive(Debug)]
pub struct ConfigTree<B> {
    root: ConfigNode<B>,
}

impl<B> Default for ConfigTree<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> ConfigTree<B> {
    pub fn new() -> Self {
        Self {
            root: ConfigNode::new(""),
        }
    }

    pub fn root(&self) -> &ConfigNode<B> {
        &self.root
    }

    // =========================================================================
    // PATH RESOLUTION
    // =========================================================================

    /// Nodes from the root down to the addressed group.
    ///
    /// `..` pops the stack immediately and never goes above the root.
    fn walk(&self, path: &str) -> Result<Vec<&ConfigNode<B>>, TreeError> {
        let mut stack = vec![&self.root];
        for seg in segments(path) {
            if seg == PARENT_GROUP {
                if stack.len() > 1 {
                    stack.pop();
                }
                continue;
            }
            let current = stack.last().copied().unwrap_or(&self.root);
            match current.child(seg) {
                Some(child) => stack.push(child),
                None => {
                    return Err(TreeError::PathNotFound {
                        path: path.to_string(),
                    })
                }
            }
        }
        Ok(stack)
    }

    /// Stored names of the groups on the path, root excluded.
    fn canonical_names(&self, path: &str) -> Result<Vec<String>, TreeError> {
        Ok(self
            .walk(path)?
            .iter()
            .skip(1)
            .map(|n| n.name().to_string())
            .collect())
    }

    fn node_by_names_mut(&mut self, names: &[String]) -> Result<&mut ConfigNode<B>, TreeError> {
        let mut node = &mut self.root;
        for name in names {
            node = node.child_mut(name).ok_or_else(|| TreeError::PathNotFound {
                path: names.join("/"),
            })?;
        }
        Ok(node)
    }

    /// Get the group at `path`.
    pub fn node(&self, path: &str) -> Result<&ConfigNode<B>, TreeError> {
        let stack = self.walk(path)?;
        Ok(stack.last().copied().unwrap_or(&self.root))
    }

    pub fn node_mut(&mut self, path: &str) -> Result<&mut ConfigNode<B>, TreeError> {
        let names = self.canonical_names(path)?;
        self.node_by_names_mut(&names)
    }

    /// Normalised absolute form of an existing group path, without leading
    /// separator. The root is `""`.
    pub fn canonical_path(&self, path: &str) -> Result<String, TreeError> {
        Ok(self.canonical_names(path)?.join("/"))
    }

    pub fn group_exists(&self, path: &str) -> bool {
        self.walk(path).is_ok()
    }

    // =========================================================================
    // GROUPS
    // =========================================================================

    /// Create the group and every missing intermediate group. Does nothing
    /// if the group already exists.
    pub fn create_group(&mut self, path: &str) -> Result<(), TreeError> {
        validate_creation_path(path)?;
        if segments(path).last() == Some(PARENT_GROUP) {
            return Err(TreeError::InvalidPath {
                path: path.to_string(),
                reason: "path must end with a group name",
            });
        }

        let mut names: Vec<String> = Vec::new();
        for seg in segments(path) {
            if seg == PARENT_GROUP {
                names.pop();
                continue;
            }
            validate_name(seg)?;
            let parent = self.node_by_names_mut(&names)?;
            let child = parent.child_or_insert(seg);
            names.push(child.name().to_string());
        }
        Ok(())
    }

    /// Create `name` inside `parent` and return the new group's path.
    pub fn create_sub_group(&mut self, parent: &str, name: &str) -> Result<String, TreeError> {
        validate_name(name)?;
        let path = join(parent, name);
        self.create_group(&path)?;
        Ok(path)
    }

    /// Remove the group and its subtree, returning the detached node.
    pub fn delete_group(&mut self, path: &str) -> Result<ConfigNode<B>, TreeError> {
        let names = self.canonical_names(path)?;
        let Some((last, parents)) = names.split_last() else {
            return Err(TreeError::RootNotAllowed);
        };
        let removed = self
            .node_by_names_mut(parents)?
            .remove_child(last)
            .ok_or_else(|| TreeError::PathNotFound {
                path: path.to_string(),
            })?;
        debug!(path = %path, "[Tree] Group deleted");
        Ok(removed)
    }

    /// Give the group at `old_path` a new name within the same parent.
    pub fn rename_group(&mut self, old_path: &str, new_name: &str) -> Result<(), TreeError> {
        validate_name(new_name)?;
        let names = self.canonical_names(old_path)?;
        let Some((last, parents)) = names.split_last() else {
            return Err(TreeError::RootNotAllowed);
        };
        let parent = self.node_by_names_mut(parents)?;
        if !same_key(last, new_name) && parent.has_child(new_name) {
            return Err(TreeError::AlreadyExists {
                path: join(&parents.join("/"), new_name),
            });
        }
        let mut node = parent
            .remove_child(last)
            .ok_or_else(|| TreeError::PathNotFound {
                path: old_path.to_string(),
            })?;
        node.set_name(new_name);
        parent.insert_child(node);
        debug!(from = %old_path, to = %new_name, "[Tree] Group renamed");
        Ok(())
    }

    /// Deep-copy parameters and subgroups of `src` into a new group `dst`.
    ///
    /// Missing parents of `dst` are created. Bound objects are not copied.
    pub fn copy_group(&mut self, src: &str, dst: &str) -> Result<(), TreeError> {
        let src_names = self.canonical_names(src)?;
        if src_names.is_empty() {
            return Err(TreeError::RootNotAllowed);
        }
        validate_creation_path(dst)?;
        if self.group_exists(dst) {
            return Err(TreeError::AlreadyExists {
                path: dst.to_string(),
            });
        }
        let (dst_parent, dst_name) = separate_last_element(dst);
        validate_name(dst_name)?;

        let mut copy = self.node_by_names_mut(&src_names)?.copy_unbound::<B>();
        copy.set_name(dst_name);

        if segments(dst_parent).next().is_some() {
            self.create_group(dst_parent)?;
        }
        let parent_names = self.canonical_names(dst_parent)?;
        self.node_by_names_mut(&parent_names)?.insert_child(copy);
        debug!(from = %src, to = %dst, "[Tree] Group copied");
        Ok(())
    }

    /// Remove every group, parameter and binding.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Independent copy of the whole tree, without bound objects.
    pub fn copy_unbound<C>(&self) -> ConfigTree<C> {
        ConfigTree {
            root: self.root.copy_unbound(),
        }
    }

    /// Attach a detached node below `parent`, replacing a child with the
    /// same name.
    pub fn graft(&mut self, parent: &str, node: ConfigNode<B>) -> Result<(), TreeError> {
        validate_name(node.name())?;
        let names = self.canonical_names(parent)?;
        let target = self.node_by_names_mut(&names)?;
        target.remove_child(node.name());
        target.insert_child(node);
        Ok(())
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    /// Value of the parameter at `path` (`group/.../name`).
    pub fn value(&self, path: &str) -> Result<String, TreeError> {
        let (group, name) = separate_last_element(path);
        self.node(group)?
            .parameter(name)
            .map(str::to_string)
            .ok_or_else(|| TreeError::ParameterNotFound {
                path: path.to_string(),
            })
    }

    /// Like [`Self::value`] but on a miss looks the same name up in each
    /// ancestor group, ending at the root.
    pub fn value_also_match_parents(&self, path: &str) -> Result<String, TreeError> {
        let (group, name) = separate_last_element(path);
        self.walk(group)?
            .iter()
            .rev()
            .find_map(|node| node.parameter(name))
            .map(str::to_string)
            .ok_or_else(|| TreeError::ParameterNotFound {
                path: path.to_string(),
            })
    }

    /// Set a parameter, creating it if the group exists but the parameter
    /// does not. An empty value removes the parameter.
    pub fn set_value(&mut self, path: &str, value: &str) -> Result<(), TreeError> {
        let (group, name) = separate_last_element(path);
        validate_name(name)?;
        let node = self.node_mut(group)?;
        if value.is_empty() {
            node.remove_parameter(name);
        } else {
            node.set_parameter(name, value);
        }
        Ok(())
    }

    /// Add a new parameter to an existing group.
    pub fn create_parameter(&mut self, group: &str, name: &str, value: &str) -> Result<(), TreeError> {
        validate_name(name)?;
        let node = self.node_mut(group)?;
        if node.has_parameter(name) {
            return Err(TreeError::AlreadyExists {
                path: join(group, name),
            });
        }
        node.set_parameter(name, value);
        Ok(())
    }

    pub fn delete_parameter(&mut self, group: &str, name: &str) -> Result<(), TreeError> {
        self.node_mut(group)?
            .remove_parameter(name)
            .map(|_| ())
            .ok_or_else(|| TreeError::ParameterNotFound {
                path: join(group, name),
            })
    }

    pub fn parameter_exists(&self, path: &str) -> bool {
        let (group, name) = separate_last_element(path);
        self.node(group)
            .map(|node| node.has_parameter(name))
            .unwrap_or(false)
    }

    // =========================================================================
    // LISTINGS
    // =========================================================================

    pub fn groups_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        Ok(self.node(group)?.children_names())
    }

    pub fn groups_with_prefix_list(&self, group: &str, prefix: &str) -> Result<Vec<String>, TreeError> {
        Ok(filter_prefix(self.groups_list(group)?, prefix))
    }

    pub fn filtered_groups_list(&self, group: &str, filter: &Regex) -> Result<Vec<String>, TreeError> {
        Ok(filter_regex(self.groups_list(group)?, filter))
    }

    pub fn parameters_list(&self, group: &str) -> Result<Vec<String>, TreeError> {
        Ok(self.node(group)?.parameter_names())
    }

    pub fn parameters_with_prefix_list(
        &self,
        group: &str,
        prefix: &str,
    ) -> Result<Vec<String>, TreeError> {
        Ok(filter_prefix(self.parameters_list(group)?, prefix))
    }

    pub fn filtered_parameters_list(
        &self,
        group: &str,
        filter: &Regex,
    ) -> Result<Vec<String>, TreeError> {
        Ok(filter_regex(self.parameters_list(group)?, filter))
    }

    // =========================================================================
    // COMPONENT SLOTS
    // =========================================================================

    pub fn slot(&self, path: &str) -> Result<&ComponentSlot<B>, TreeError> {
        Ok(self.node(path)?.slot())
    }

    /// Move the slot to `next`, keeping the bound object.
    pub fn set_status(&mut self, path: &str, next: ConstructionStatus) -> Result<(), TreeError> {
        let slot = self.node_mut(path)?.slot_mut();
        check_transition(path, slot.status, next)?;
        slot.status = next;
        Ok(())
    }

    /// Move the slot to `next` and bind `object`.
    pub fn bind(&mut self, path: &str, next: ConstructionStatus, object: B) -> Result<(), TreeError> {
        let slot = self.node_mut(path)?.slot_mut();
        check_transition(path, slot.status, next)?;
        slot.status = next;
        slot.object = Some(object);
        Ok(())
    }

    /// Reset the slot to `NotCreated`, returning the object it held.
    pub fn unbind(&mut self, path: &str) -> Result<Option<B>, TreeError> {
        let slot = self.node_mut(path)?.slot_mut();
        Ok(std::mem::take(slot).object)
    }

    /// Unbind every object of the subtree at `path`, parent first. Paths
    /// in the result are canonical.
    pub fn take_bound_subtree(&mut self, path: &str) -> Result<Vec<(String, B)>, TreeError> {
        let names = self.canonical_names(path)?;
        let base = names.join("/");
        let mut out = Vec::new();
        self.node_by_names_mut(&names)?
            .take_bound_preorder(&base, &mut out);
        Ok(out)
    }

    /// Bound objects of the subtree at `path`, parent first.
    pub fn bound_objects(&self, path: &str) -> Result<Vec<(String, &B)>, TreeError> {
        let base = self.canonical_path(path)?;
        let mut out = Vec::new();
        self.node(path)?.visit_bound_preorder(&base, &mut out);
        Ok(out)
    }
}

fn check_transition(
    path: &str,
    from: ConstructionStatus,
    to: ConstructionStatus,
) -> Result<(), TreeError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TreeError::IllegalTransition {
            path: path.to_string(),
            from,
            to,
        })
    }
}

fn filter_prefix(names: Vec<String>, prefix: &str) -> Vec<String> {
    names.into_iter().filter(|n| n.starts_with(prefix)).collect()
}

fn filter_regex(names: Vec<String>, filter: &Regex) -> Vec<String> {
    names.into_iter().filter(|n| filter.is_match(n)).collect()
}
