//! # Type Descriptions
//!
//! Types may document their parameters and subgroups when they are
//! registered. Descriptions are stored in a plain configuration tree:
//!
//! ```text
//! <Type>/shortHelp
//! <Type>/longHelp
//! <Type>/Parameters/<name>/{type, default, lowerBound, upperBound, enum:N,
//!                           isList, isMandatory, allowMultiple,
//!                           shortHelp, longHelp, componentType}
//! <Type>/Subgroups/<name>/{type, shortHelp, longHelp, componentType, ...}
//! ```
//!
//! Writing a description never fails registration: a rejected key is
//! logged and skipped.

use cf_01_config_tree::paths::{join, validate_name};
use cf_01_config_tree::ConfigTree;
use std::fmt::Display;
use tracing::warn;

const PARAMETERS_GROUP: &str = "Parameters";
const SUBGROUPS_GROUP: &str = "Subgroups";

/// Kind of a described parameter, written as its `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Int,
    Real,
    Bool,
    Enum,
    Component,
    Subgroup,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Int => "int",
            ParameterKind::Real => "real",
            ParameterKind::Bool => "bool",
            ParameterKind::Enum => "enum",
            ParameterKind::Component => "component",
            ParameterKind::Subgroup => "subgroup",
        }
    }
}

/// Boolean properties of a described parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterProperties {
    pub is_list: bool,
    pub is_mandatory: bool,
    pub allow_multiple: bool,
}

impl ParameterProperties {
    pub fn mandatory() -> Self {
        Self {
            is_mandatory: true,
            ..Self::default()
        }
    }
}

/// Description of one type, handed to the registration hook.
pub struct TypeDescription<'a> {
    tree: &'a mut ConfigTree<()>,
    type_name: String,
}

impl<'a> TypeDescription<'a> {
    pub(crate) fn new(tree: &'a mut ConfigTree<()>, type_name: &str) -> Self {
        write_group(tree, type_name);
        Self {
            tree,
            type_name: type_name.to_string(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Short and long help of the type. An empty long help repeats the
    /// short one.
    pub fn help(&mut self, short: &str, long: &str) -> &mut Self {
        write_help(self.tree, &self.type_name, short, long);
        self
    }

    pub fn describe_string(&mut self, name: &str) -> ParameterDescription<'_> {
        self.describe_parameter(name, ParameterKind::String)
    }

    pub fn describe_int(&mut self, name: &str) -> ParameterDescription<'_> {
        self.describe_parameter(name, ParameterKind::Int)
    }

    pub fn describe_real(&mut self, name: &str) -> ParameterDescription<'_> {
        self.describe_parameter(name, ParameterKind::Real)
    }

    pub fn describe_bool(&mut self, name: &str) -> ParameterDescription<'_> {
        self.describe_parameter(name, ParameterKind::Bool)
    }

    pub fn describe_enum(&mut self, name: &str, values: &[&str]) -> ParameterDescription<'_> {
        self.describe_parameter(name, ParameterKind::Enum).values(values)
    }

    /// A parameter naming another group whose object must be a
    /// `component_type`.
    pub fn describe_component(
        &mut self,
        name: &str,
        component_type: &str,
    ) -> ParameterDescription<'_> {
        self.describe_parameter(name, ParameterKind::Component)
            .component_type(component_type)
    }

    /// A subgroup whose object must be a `component_type`.
    pub fn describe_subgroup(
        &mut self,
        name: &str,
        component_type: &str,
    ) -> ParameterDescription<'_> {
        let group = join(&self.type_name, SUBGROUPS_GROUP);
        ParameterDescription::start(self.tree, &group, name, ParameterKind::Subgroup)
            .component_type(component_type)
    }

    fn describe_parameter(&mut self, name: &str, kind: ParameterKind) -> ParameterDescription<'_> {
        let group = join(&self.type_name, PARAMETERS_GROUP);
        ParameterDescription::start(self.tree, &group, name, kind)
    }
}

/// Builder for the keys of one parameter or subgroup description.
///
/// A builder started with an invalid name writes nothing.
pub struct ParameterDescription<'a> {
    tree: &'a mut ConfigTree<()>,
    path: Option<String>,
}

impl<'a> ParameterDescription<'a> {
    fn start(tree: &'a mut ConfigTree<()>, group: &str, name: &str, kind: ParameterKind) -> Self {
        let path = match validate_name(name) {
            Ok(()) => {
                let path = join(group, name);
                write_group(tree, &path);
                Some(path)
            }
            Err(e) => {
                warn!(group = %group, error = %e, "[Registry] Skipping parameter description");
                None
            }
        };
        let mut this = Self { tree, path };
        this.write("type", kind.as_str());
        this
    }

    pub fn default_value(mut self, value: impl Display) -> Self {
        self.write("default", &value.to_string());
        self
    }

    pub fn limits(mut self, lower: impl Display, upper: impl Display) -> Self {
        self.write("lowerBound", &lower.to_string());
        self.write("upperBound", &upper.to_string());
        self
    }

    /// Allowed values of an enum, written as `enum:0`, `enum:1`, ...
    pub fn values(mut self, values: &[&str]) -> Self {
        for (i, value) in values.iter().enumerate() {
            self.write(&format!("enum:{i}"), value);
        }
        self
    }

    pub fn help(self, short: &str, long: &str) -> Self {
        if let Some(path) = &self.path {
            write_help(self.tree, path, short, long);
        }
        self
    }

    pub fn props(mut self, props: ParameterProperties) -> Self {
        self.write("isList", bool_str(props.is_list));
        self.write("isMandatory", bool_str(props.is_mandatory));
        self.write("allowMultiple", bool_str(props.allow_multiple));
        self
    }

    pub fn component_type(mut self, type_name: &str) -> Self {
        self.write("componentType", type_name);
        self
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Some(path) = &self.path {
            write_value(self.tree, &join(path, key), value);
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn write_group(tree: &mut ConfigTree<()>, path: &str) {
    if let Err(e) = tree.create_group(path) {
        warn!(path = %path, error = %e, "[Registry] Skipping type description group");
    }
}

fn write_help(tree: &mut ConfigTree<()>, group: &str, short: &str, long: &str) {
    write_value(tree, &join(group, "shortHelp"), short);
    let long = if long.is_empty() { short } else { long };
    write_value(tree, &join(group, "longHelp"), long);
}

fn write_value(tree: &mut ConfigTree<()>, path: &str, value: &str) {
    if let Err(e) = tree.set_value(path, value) {
        warn!(path = %path, error = %e, "[Registry] Skipping type description key");
    }
}
