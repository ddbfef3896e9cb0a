//! Authorizer settings loaded from YAML.
//!
//! Every field has a default, so an empty document or a missing `--config`
//! yields the stock behavior.

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for an [`Authorizer`](crate::Authorizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Memoize provided rules per user for the lifetime of the authorizer
    pub cache_provided_rules: bool,
    /// The action whose matched rules contribute read record-part permissions
    pub read_action: String,
    /// Prefix the calculator puts in front of every required value
    pub system_scheme: String,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            cache_provided_rules: true,
            read_action: "read".to_string(),
            system_scheme: "system.".to_string(),
        }
    }
}

impl AuthzConfig {
    /// Create from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AuthzConfig = serde_yaml::from_str(content)
            .map_err(|e| AuthzError::Configuration(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuthzError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_action.is_empty() {
            return Err(AuthzError::Configuration(
                "read_action cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
