//! Engine configuration loaded from a JSON file

use crate::error::{Result, RuleError};
use crate::rule::{AttributeCatalog, LogicalOperator, Parser, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine configuration
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum parenthesis nesting accepted by the parser
    pub max_depth: usize,
    /// Operator used when combining rules without an explicit one
    pub default_operator: LogicalOperator,
    /// Location of the JSON rule store
    pub store_path: PathBuf,
    /// Permitted attribute names; `None` disables validation
    pub attributes: Option<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_operator: LogicalOperator::And,
            store_path: PathBuf::from("rules.json"),
            attributes: None,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RuleError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Load from a JSON file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| RuleError::ConfigError(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(RuleError::ConfigError(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if let Some(attributes) = &self.attributes {
            if let Some(blank) = attributes.iter().find(|a| a.trim().is_empty()) {
                return Err(RuleError::ConfigError(format!(
                    "attribute names must not be blank: {:?}",
                    blank
                )));
            }
        }
        Ok(())
    }

    /// Parser honoring `max_depth`
    pub fn parser(&self) -> Parser {
        Parser::with_max_depth(self.max_depth)
    }

    /// Attribute catalog, if one is configured
    pub fn catalog(&self) -> Option<AttributeCatalog> {
        self.attributes
            .as_ref()
            .map(|names| AttributeCatalog::new(names.iter().cloned()))
    }
}
