//! Factory configuration.

use cf_01_config_tree::paths::validate_name;
use serde::{Deserialize, Serialize};
use shared_types::FactoryError;

/// Default name of the parameter holding a group's type name.
pub const DEFAULT_TYPE_PARAMETER: &str = "type";

/// Default bound on nested resolution depth.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Tunables of a configuration manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Parameter read to find the type of a group.
    pub type_parameter: String,
    /// Nested resolutions deeper than this fail with `RecursionLimit`.
    pub max_recursion_depth: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            type_parameter: DEFAULT_TYPE_PARAMETER.to_string(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

impl FactoryConfig {
    pub fn validate(&self) -> Result<(), FactoryError> {
        if validate_name(&self.type_parameter).is_err() {
            return Err(FactoryError::InvalidConfig(format!(
                "type parameter \"{}\" is not a valid parameter name",
                self.type_parameter
            )));
        }
        if self.max_recursion_depth == 0 {
            return Err(FactoryError::InvalidConfig(
                "max_recursion_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
