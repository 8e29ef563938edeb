//! Configuration nodes (groups)

use super::key::ConfigKey;
use shared_types::ConstructionStatus;
use std::collections::BTreeMap;

/// Object bound to a node together with its construction status.
#[derive(Debug, Clone)]
pub struct ComponentSlot<B> {
    pub status: ConstructionStatus,
    pub object: Option<B>,
}

impl<B> Default for ComponentSlot<B> {
    fn default() -> Self {
        Self {
            status: ConstructionStatus::NotCreated,
            object: None,
        }
    }
}

/// A group: ordered children, parameters and one component slot.
///
/// `B` is the type of the bound object handle.
#[derive(Debug)]
pub struct ConfigNode<B> {
    name: String,
    children: BTreeMap<ConfigKey, ConfigNode<B>>,
    parameters: BTreeMap<ConfigKey, String>,
    slot: ComponentSlot<B>,
}

impl<B> ConfigNode<B> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: BTreeMap::new(),
            parameters: BTreeMap::new(),
            slot: ComponentSlot::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn child(&self, name: &str) -> Option<&ConfigNode<B>> {
        self.children.get(&ConfigKey::new(name))
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut ConfigNode<B>> {
        self.children.get_mut(&ConfigKey::new(name))
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.contains_key(&ConfigKey::new(name))
    }

    /// Get the child, creating it when missing.
    pub(crate) fn child_or_insert(&mut self, name: &str) -> &mut ConfigNode<B> {
        self.children
            .entry(ConfigKey::new(name))
            .or_insert_with(|| ConfigNode::new(name))
    }

    pub(crate) fn insert_child(&mut self, node: ConfigNode<B>) {
        self.children.insert(ConfigKey::new(node.name.clone()), node);
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Option<ConfigNode<B>> {
        self.children.remove(&ConfigKey::new(name))
    }

    /// Child group names in key order.
    pub fn children_names(&self) -> Vec<String> {
        self.children.keys().map(|k| k.as_str().to_string()).collect()
    }

    pub fn children(&self) -> impl Iterator<Item = &ConfigNode<B>> {
        self.children.values()
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(&ConfigKey::new(name)).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(&ConfigKey::new(name))
    }

    pub(crate) fn set_parameter(&mut self, name: &str, value: impl Into<String>) {
        match self.parameters.get_mut(&ConfigKey::new(name)) {
            Some(existing) => *existing = value.into(),
            None => {
                self.parameters.insert(ConfigKey::new(name), value.into());
            }
        }
    }

    pub(crate) fn remove_parameter(&mut self, name: &str) -> Option<String> {
        self.parameters.remove(&ConfigKey::new(name))
    }

    /// Parameter names in key order.
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.keys().map(|k| k.as_str().to_string()).collect()
    }

    /// `(name, value)` pairs in key order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn slot(&self) -> &ComponentSlot<B> {
        &self.slot
    }

    pub(crate) fn slot_mut(&mut self) -> &mut ComponentSlot<B> {
        &mut self.slot
    }

    /// Drop children, parameters and the bound object.
    pub(crate) fn clear(&mut self) {
        self.children.clear();
        self.parameters.clear();
        self.slot = ComponentSlot::default();
    }

    /// Deep copy of names, parameters and subgroups. Bound objects are not
    /// copied, so the copy may use another handle type.
    pub fn copy_unbound<C>(&self) -> ConfigNode<C> {
        ConfigNode {
            name: self.name.clone(),
            children: self
                .children
                .iter()
                .map(|(k, child)| (k.clone(), child.copy_unbound()))
                .collect(),
            parameters: self.parameters.clone(),
            slot: ComponentSlot::default(),
        }
    }

    /// Take every bound object of this subtree, parent before children,
    /// resetting each slot to `NotCreated`.
    pub(crate) fn take_bound_preorder(&mut self, path: &str, out: &mut Vec<(String, B)>) {
        let slot = std::mem::take(&mut self.slot);
        if let Some(object) = slot.object {
            out.push((path.to_string(), object));
        }
        for (key, child) in self.children.iter_mut() {
            let child_path = super::path::join(path, key.as_str());
            child.take_bound_preorder(&child_path, out);
        }
    }

    /// Visit every bound object of this subtree, parent before children.
    pub(crate) fn visit_bound_preorder<'a>(&'a self, path: &str, out: &mut Vec<(String, &'a B)>) {
        if let Some(object) = self.slot.object.as_ref() {
            out.push((path.to_string(), object));
        }
        for (key, child) in &self.children {
            let child_path = super::path::join(path, key.as_str());
            child.visit_bound_preorder(&child_path, out);
        }
    }
}
