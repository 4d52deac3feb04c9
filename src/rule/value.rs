//! Data-side values and records

use crate::error::{EvalFailure, RuleError};
use crate::rule::ast::{format_number, parse_finite};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Attribute value supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Numeric view; strings count when they parse as a finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_finite(s),
            Value::Boolean(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A mapping from attribute name to value
pub trait DataRecord {
    fn get_value(&self, attribute: &str) -> Option<&Value>;
}

impl<S: BuildHasher> DataRecord for HashMap<String, Value, S> {
    fn get_value(&self, attribute: &str) -> Option<&Value> {
        self.get(attribute)
    }
}

impl DataRecord for AHashMap<String, Value> {
    fn get_value(&self, attribute: &str) -> Option<&Value> {
        self.get(attribute)
    }
}

impl DataRecord for BTreeMap<String, Value> {
    fn get_value(&self, attribute: &str) -> Option<&Value> {
        self.get(attribute)
    }
}

impl<R: DataRecord + ?Sized> DataRecord for &R {
    fn get_value(&self, attribute: &str) -> Option<&Value> {
        (**self).get_value(attribute)
    }
}

/// Owned record type used by the CLI and bindings
pub type Record = HashMap<String, Value>;

/// Build a record from a JSON object, rejecting nested arrays / objects / nulls
pub fn record_from_json(json: &serde_json::Value) -> crate::error::Result<Record> {
    let object = json.as_object().ok_or_else(|| {
        RuleError::EvalError(EvalFailure::InvalidRecord(
            "data record must be a JSON object".to_string(),
        ))
    })?;

    object
        .iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::Bool(b) => Value::Boolean(*b),
                serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
                serde_json::Value::String(s) => Value::String(s.clone()),
                other => {
                    return Err(RuleError::EvalError(EvalFailure::InvalidRecord(format!(
                        "unsupported value for '{}': {}",
                        key, other
                    ))))
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}
