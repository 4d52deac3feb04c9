//! Parsed-rule cache shared by every caller of `check_rule`
//!
//! Rule strings come from callers, not from a fixed rule set, so the map is
//! capped at [`CACHE_CAPACITY`] entries. Inserting into a full cache evicts one
//! arbitrary entry (ahash iteration order is randomized per process).

use std::sync::Arc;

use crate::error::Result;
use crate::rule::ast::AstNode;
use crate::rule::evaluator;
use crate::rule::parser;
use crate::rule::value::DataRecord;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

/// Maximum number of cached rule strings
pub const CACHE_CAPACITY: usize = 1024;

static RULE_CACHE: Lazy<RwLock<AHashMap<String, Arc<AstNode>>>> =
    Lazy::new(|| RwLock::new(AHashMap::with_capacity(CACHE_CAPACITY)));

/// Parsed AST for `rule`, parsing and caching it on a miss
///
/// Parse failures are returned and never cached.
pub fn get_or_parse(rule: &str) -> Result<Arc<AstNode>> {
    if let Some(ast) = RULE_CACHE.read().get(rule) {
        return Ok(Arc::clone(ast));
    }

    let ast = Arc::new(parser::parse(rule)?);

    let mut cache = RULE_CACHE.write();
    if cache.len() >= CACHE_CAPACITY && !cache.contains_key(rule) {
        if let Some(victim) = cache.keys().next().cloned() {
            cache.remove(&victim);
            trace!(evicted = %victim, "rule cache full");
        }
    }
    // Another thread may have parsed the same rule meanwhile; keep its entry
    let cached = cache
        .entry(rule.to_string())
        .or_insert_with(|| Arc::clone(&ast));
    Ok(Arc::clone(cached))
}

/// Check a rule string against a data record, using the cached AST
///
/// An empty rule is vacuously true.
pub fn check_rule<R: DataRecord + ?Sized>(rule: &str, data: &R) -> Result<bool> {
    if rule.trim().is_empty() {
        return Ok(true);
    }

    let ast = get_or_parse(rule)?;
    evaluator::evaluate(&ast, data)
}

pub fn clear_cache() {
    RULE_CACHE.write().clear();
}

/// Number of cached rules
pub fn cache_size() -> usize {
    RULE_CACHE.read().len()
}

/// Serializes tests that inspect the process-wide cache
#[cfg(test)]
pub(crate) static CACHE_TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());
