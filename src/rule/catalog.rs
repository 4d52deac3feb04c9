//! Attribute catalog validation

use crate::error::{Result, RuleError};
use crate::rule::ast::AstNode;
use ahash::AHashSet;

/// Attributes known to the original HR sample data
pub const DEFAULT_ATTRIBUTES: [&str; 4] = ["age", "department", "salary", "experience"];

/// Set of attribute names a rule may reference
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    names: AHashSet<String>,
}

impl AttributeCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn default_catalog() -> Self {
        Self::new(DEFAULT_ATTRIBUTES)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Fail on the first attribute (left to right) missing from the catalog
    pub fn validate(&self, ast: &AstNode) -> Result<()> {
        match ast.attributes().into_iter().find(|name| !self.contains(name)) {
            Some(unknown) => Err(RuleError::UnknownAttribute(unknown.to_string())),
            None => Ok(()),
        }
    }
}
