//! Rule string persistence
//!
//! Only source text is stored; callers re-parse on every load, so a stored
//! rule can never drift from its AST.

use crate::error::{Result, RuleError};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Key-value storage of rule strings by name
pub trait RuleStore {
    /// Store `rule_string` under `name`, replacing any previous rule
    fn save(&self, name: &str, rule_string: &str) -> Result<()>;

    /// Fetch the rule string saved under `name`
    fn load(&self, name: &str) -> Result<String>;

    /// Remove `name`, failing with `RuleNotFound` if absent
    fn delete(&self, name: &str) -> Result<()>;

    /// All rule names, sorted
    fn names(&self) -> Result<Vec<String>>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<AHashMap<String, String>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn save(&self, name: &str, rule_string: &str) -> Result<()> {
        validate_name(name)?;
        self.rules
            .write()
            .insert(name.to_string(), rule_string.to_string());
        debug!(name, "rule saved in memory");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<String> {
        self.rules
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::RuleNotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.rules
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RuleError::RuleNotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.rules.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// JSON-file store: a single object mapping names to rule strings
///
/// The file is read on every operation and rewritten on every mutation.
/// A missing file is treated as an empty store.
#[derive(Debug)]
pub struct FileRuleStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            RuleError::StorageError(format!(
                "failed to read rule store {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, rules: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(rules)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl RuleStore for FileRuleStore {
    #[instrument(skip(self, rule_string), fields(path = %self.path.display()))]
    fn save(&self, name: &str, rule_string: &str) -> Result<()> {
        validate_name(name)?;
        let _guard = self.lock.write();

        let mut rules = self.read_all()?;
        if rules
            .insert(name.to_string(), rule_string.to_string())
            .is_some()
        {
            warn!(name, "overwriting existing rule");
        }
        self.write_all(&rules)?;

        info!(name, "rule saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self, name: &str) -> Result<String> {
        let _guard = self.lock.read();
        let rule = self
            .read_all()?
            .remove(name)
            .ok_or_else(|| RuleError::RuleNotFound(name.to_string()))?;

        info!(name, "rule loaded");
        Ok(rule)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn delete(&self, name: &str) -> Result<()> {
        let _guard = self.lock.write();

        let mut rules = self.read_all()?;
        if rules.remove(name).is_none() {
            return Err(RuleError::RuleNotFound(name.to_string()));
        }
        self.write_all(&rules)?;

        info!(name, "rule deleted");
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read();
        Ok(self.read_all()?.into_keys().collect())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RuleError::StorageError(
            "rule name must not be empty".to_string(),
        ));
    }
    Ok(())
}
