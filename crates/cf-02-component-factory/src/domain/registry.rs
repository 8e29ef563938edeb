//! # Type Registry
//!
//! Process-wide catalog of component types: name, parents, flags, creator
//! and an optional description.
//!
//! ## Registration rules
//!
//! - Every parent must already be registered (an interface may have none)
//! - A component type (concrete, or abstract non-interface) needs at least
//!   one parent that is itself a component
//! - A type configuring in its constructor can not extend a component that
//!   configures in `configure()`
//! - Registering a name again is accepted only if nothing observable
//!   changes: same parents, same flags, same configuration strategy
//!
//! The root type [`ROOT_COMPONENT_TYPE`] is pre-registered as an abstract
//! component that configures in its constructor.

use super::component::{Component, ComponentCreator, ComponentHandle};
use super::description::TypeDescription;
use crate::service::ComponentContext;
use cf_01_config_tree::paths::validate_name;
use cf_01_config_tree::ConfigTree;
use cf_telemetry::metrics::TYPES_REGISTERED;
use parking_lot::RwLock;
use shared_types::{FactoryError, RegistryError, TypeDescriptor, ROOT_COMPONENT_TYPE};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hook filling the description of a type at registration.
pub type DescribeHook = Box<dyn FnOnce(&mut TypeDescription<'_>)>;

/// Everything needed to register one type.
pub struct TypeRegistration {
    descriptor: TypeDescriptor,
    creator: Option<Arc<dyn ComponentCreator>>,
    describe: Option<DescribeHook>,
}

impl TypeRegistration {
    /// A type the factory can instantiate.
    pub fn concrete(name: impl Into<String>) -> Self {
        Self::from_descriptor(TypeDescriptor::new(name))
    }

    /// A component type with no creator.
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self::from_descriptor(TypeDescriptor::new(name).abstract_type())
    }

    /// A capability that is not a component by itself.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::from_descriptor(TypeDescriptor::new(name).interface())
    }

    pub fn from_descriptor(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            creator: None,
            describe: None,
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.with_parent(parent);
        self
    }

    pub fn parents(mut self, parents: &[&str]) -> Self {
        for parent in parents {
            self.descriptor = self.descriptor.with_parent(*parent);
        }
        self
    }

    pub fn configures_in_constructor(mut self, value: bool) -> Self {
        self.descriptor = self.descriptor.configures_in_constructor(value);
        self
    }

    pub fn creator(mut self, creator: impl ComponentCreator + 'static) -> Self {
        self.creator = Some(Arc::new(creator));
        self
    }

    /// Creator from a constructor returning the concrete type.
    pub fn constructor<T, F>(self, constructor: F) -> Self
    where
        T: Component,
        F: Fn(&ComponentContext) -> Result<T, FactoryError> + Send + Sync + 'static,
    {
        self.creator(move |ctx: &ComponentContext| -> Result<ComponentHandle, FactoryError> {
            Ok(Arc::new(constructor(ctx)?))
        })
    }

    pub fn describe(mut self, hook: impl FnOnce(&mut TypeDescription<'_>) + 'static) -> Self {
        self.describe = Some(Box::new(hook));
        self
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

struct RegistryInner {
    types: BTreeMap<String, TypeDescriptor>,
    creators: HashMap<String, Arc<dyn ComponentCreator>>,
    /// Direct children of each type, in registration order.
    children: HashMap<String, Vec<String>>,
    descriptions: ConfigTree<()>,
}

/// Catalog of registered component types.
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding only the root component type.
    pub fn new() -> Self {
        let root = TypeDescriptor::new(ROOT_COMPONENT_TYPE)
            .abstract_type()
            .configures_in_constructor(true);
        let mut descriptions = ConfigTree::new();
        TypeDescription::new(&mut descriptions, ROOT_COMPONENT_TYPE)
            .help("The base type of every component", "");

        let mut types = BTreeMap::new();
        types.insert(ROOT_COMPONENT_TYPE.to_string(), root);
        Self {
            inner: RwLock::new(RegistryInner {
                types,
                creators: HashMap::new(),
                children: HashMap::new(),
                descriptions,
            }),
        }
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    pub fn register(&self, registration: TypeRegistration) -> Result<(), RegistryError> {
        let TypeRegistration {
            descriptor,
            creator,
            describe,
        } = registration;
        let name = descriptor.name.clone();

        {
            let mut inner = self.inner.write();
            check_parents_registered(&inner.types, &descriptor)?;
            let existing = inner.types.get(&name);
            if let Some(old) = existing {
                check_re_registration(old, &descriptor)?;
            }
            if !descriptor.is_interface || descriptor.can_be_created {
                check_component_registration(&inner.types, &descriptor)?;
            }

            let is_new = existing.is_none();
            if is_new {
                for parent in &descriptor.parents {
                    inner
                        .children
                        .entry(parent.clone())
                        .or_default()
                        .push(name.clone());
                }
                inner.types.insert(name.clone(), descriptor.clone());
            }
            if let Some(creator) = creator {
                inner.creators.insert(name.clone(), creator);
            }

            if is_new {
                TYPES_REGISTERED.inc();
                info!(
                    type_name = %name,
                    parents = ?descriptor.parents,
                    interface = descriptor.is_interface,
                    concrete = descriptor.can_be_created,
                    "[Registry] Type registered"
                );
            } else {
                debug!(type_name = %name, "[Registry] Type re-registered");
            }
        }

        if let Some(hook) = describe {
            self.store_description(&name, hook);
        }
        Ok(())
    }

    /// Positional form of [`TypeRegistry::register`].
    pub fn register_type(
        &self,
        name: &str,
        parents: &[&str],
        is_interface: bool,
        can_be_created: bool,
        configures_in_constructor: bool,
        creator: Option<Arc<dyn ComponentCreator>>,
    ) -> Result<(), RegistryError> {
        let mut descriptor = TypeDescriptor::new(name).configures_in_constructor(configures_in_constructor);
        for parent in parents {
            descriptor = descriptor.with_parent(*parent);
        }
        descriptor.is_interface = is_interface;
        descriptor.can_be_created = can_be_created;
        self.register(TypeRegistration {
            descriptor,
            creator,
            describe: None,
        })
    }

    // Hooks run on a scratch tree so they never see the registry lock.
    fn store_description(&self, name: &str, hook: DescribeHook) {
        if let Err(e) = validate_name(name) {
            warn!(type_name = %name, error = %e, "[Registry] Type name can not hold a description");
            return;
        }
        let mut scratch: ConfigTree<()> = ConfigTree::new();
        {
            let mut description = TypeDescription::new(&mut scratch, name);
            hook(&mut description);
        }
        let grafted = scratch
            .delete_group(name)
            .and_then(|node| self.inner.write().descriptions.graft("", node));
        if let Err(e) = grafted {
            warn!(type_name = %name, error = %e, "[Registry] Type description dropped");
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn is_type_registered(&self, name: &str) -> bool {
        self.inner.read().types.contains_key(name)
    }

    pub fn type_info(&self, name: &str) -> Result<TypeDescriptor, RegistryError> {
        self.inner
            .read()
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ClassNameNotRegistered(name.to_string()))
    }

    /// Creator of a concrete type.
    pub fn get_creator(&self, name: &str) -> Result<Arc<dyn ComponentCreator>, RegistryError> {
        let inner = self.inner.read();
        if !inner.types.contains_key(name) {
            return Err(RegistryError::ClassNameNotRegistered(name.to_string()));
        }
        inner
            .creators
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ClassNameIsAbstract(name.to_string()))
    }

    /// Descendants of `name`, level by level. `max_depth` of `None` walks
    /// the whole hierarchy; abstract types are still walked through when
    /// `exclude_abstract` drops them from the result.
    pub fn get_all_subclasses(
        &self,
        name: &str,
        max_depth: Option<usize>,
        exclude_abstract: bool,
    ) -> Result<Vec<String>, RegistryError> {
        let inner = self.inner.read();
        if !inner.types.contains_key(name) {
            return Err(RegistryError::ClassNameNotRegistered(name.to_string()));
        }

        let mut result = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut frontier: Vec<&str> = vec![name];
        let mut depth = 0;
        while !frontier.is_empty() && max_depth.map_or(true, |max| depth < max) {
            let mut next = Vec::new();
            for current in frontier {
                for child in inner.children.get(current).into_iter().flatten() {
                    if seen.insert(child.as_str()) {
                        next.push(child.as_str());
                    }
                }
            }
            for child in &next {
                let concrete = inner.types.get(*child).is_some_and(|t| t.can_be_created);
                if !exclude_abstract || concrete {
                    result.push(child.to_string());
                }
            }
            frontier = next;
            depth += 1;
        }
        Ok(result)
    }

    pub fn direct_parents(&self, name: &str) -> Result<Vec<String>, RegistryError> {
        Ok(self.type_info(name)?.parents)
    }

    /// True if `ancestor` is `name` or one of its ancestors.
    pub fn is_descendant_of(&self, name: &str, ancestor: &str) -> bool {
        let inner = self.inner.read();
        let mut queue: VecDeque<&str> = VecDeque::from([name]);
        let mut visited: HashSet<&str> = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if current == ancestor {
                return inner.types.contains_key(current);
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(info) = inner.types.get(current) {
                queue.extend(info.parents.iter().map(String::as_str));
            }
        }
        false
    }

    /// Every registered name, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        self.inner.read().types.keys().cloned().collect()
    }

    pub fn is_interface(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.type_info(name)?.is_interface)
    }

    /// Snapshot of every stored type description.
    pub fn type_description_tree(&self) -> ConfigTree<()> {
        self.inner.read().descriptions.copy_unbound()
    }

    /// One description key, e.g. `Motor/Parameters/speed/default`.
    pub fn description_value(&self, path: &str) -> Option<String> {
        self.inner.read().descriptions.value(path).ok()
    }
}

// =============================================================================
// REGISTRATION CHECKS
// =============================================================================

fn check_parents_registered(
    types: &BTreeMap<String, TypeDescriptor>,
    descriptor: &TypeDescriptor,
) -> Result<(), RegistryError> {
    if descriptor.is_interface && descriptor.parents.is_empty() {
        return Ok(());
    }
    match descriptor.parents.iter().find(|p| !types.contains_key(*p)) {
        Some(missing) => Err(RegistryError::AncestorNotRegistered {
            type_name: descriptor.name.clone(),
            ancestor: missing.clone(),
        }),
        None => Ok(()),
    }
}

fn check_component_registration(
    types: &BTreeMap<String, TypeDescriptor>,
    descriptor: &TypeDescriptor,
) -> Result<(), RegistryError> {
    let component_parents: Vec<&TypeDescriptor> = descriptor
        .parents
        .iter()
        .filter_map(|p| types.get(p))
        .filter(|p| p.can_be_created || !p.is_interface)
        .collect();
    if component_parents.is_empty() {
        return Err(RegistryError::ComponentHasNoParentComponent {
            type_name: descriptor.name.clone(),
        });
    }
    if descriptor.configures_in_constructor {
        if let Some(parent) = component_parents
            .iter()
            .find(|p| !p.configures_in_constructor)
        {
            return Err(RegistryError::IncompatibleConfigurationStrategies {
                type_name: descriptor.name.clone(),
                ancestor: parent.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_re_registration(
    old: &TypeDescriptor,
    new: &TypeDescriptor,
) -> Result<(), RegistryError> {
    let refuse = |reason| {
        Err(RegistryError::CannotReRegisterType {
            type_name: new.name.clone(),
            reason,
        })
    };

    let old_parents: HashSet<&String> = old.parents.iter().collect();
    let new_parents: HashSet<&String> = new.parents.iter().collect();
    if old_parents != new_parents {
        return refuse("parents differ");
    }
    if new.can_be_created {
        if !old.can_be_created {
            return refuse("type was registered as abstract");
        }
        if old.configures_in_constructor != new.configures_in_constructor {
            return refuse("configuration strategy differs");
        }
    } else {
        if old.can_be_created {
            return refuse("type was registered as concrete");
        }
        if old.is_interface != new.is_interface {
            return refuse("interface flag differs");
        }
        if !new.is_interface && old.configures_in_constructor != new.configures_in_constructor {
            return refuse("configuration strategy differs");
        }
    }
    Ok(())
}
