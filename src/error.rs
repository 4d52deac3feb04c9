//! Error types for the rule engine

use thiserror::Error;

/// Main error type for the rule engine
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Lex error: {0}")]
    LexError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Combine error: {0}")]
    CombineError(String),

    #[error("Eval error: {0}")]
    EvalError(EvalFailure),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why an evaluation failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalFailure {
    #[error("missing attribute '{0}'")]
    MissingAttribute(String),

    #[error("non-comparable types: {0}")]
    NonComparable(String),

    #[error("{0}")]
    InvalidRecord(String),
}

/// Stable, machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Parse,
    Combine,
    Eval,
    InvalidPath,
    UnknownAttribute,
    NotFound,
    Storage,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lex => "lex_error",
            ErrorKind::Parse => "parse_error",
            ErrorKind::Combine => "combine_error",
            ErrorKind::Eval => "eval_error",
            ErrorKind::InvalidPath => "invalid_path",
            ErrorKind::UnknownAttribute => "unknown_attribute",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage_error",
            ErrorKind::Config => "config_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RuleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuleError::LexError(_) => ErrorKind::Lex,
            RuleError::ParseError(_) => ErrorKind::Parse,
            RuleError::CombineError(_) => ErrorKind::Combine,
            RuleError::EvalError(_) => ErrorKind::Eval,
            RuleError::InvalidPath(_) => ErrorKind::InvalidPath,
            RuleError::UnknownAttribute(_) => ErrorKind::UnknownAttribute,
            RuleError::RuleNotFound(_) => ErrorKind::NotFound,
            RuleError::StorageError(_) | RuleError::Io(_) | RuleError::Serialization(_) => {
                ErrorKind::Storage
            }
            RuleError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// The descriptive detail, without the kind prefix
    pub fn detail(&self) -> String {
        match self {
            RuleError::LexError(msg)
            | RuleError::ParseError(msg)
            | RuleError::CombineError(msg)
            | RuleError::InvalidPath(msg)
            | RuleError::UnknownAttribute(msg)
            | RuleError::RuleNotFound(msg)
            | RuleError::StorageError(msg)
            | RuleError::ConfigError(msg) => msg.clone(),
            RuleError::EvalError(failure) => failure.to_string(),
            RuleError::Io(e) => e.to_string(),
            RuleError::Serialization(e) => e.to_string(),
        }
    }
}

#[cfg(feature = "python")]
impl From<RuleError> for pyo3::PyErr {
    fn from(err: RuleError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyTypeError, PyValueError};

        let message = err.to_string();
        match err {
            RuleError::LexError(_)
            | RuleError::ParseError(_)
            | RuleError::CombineError(_)
            | RuleError::InvalidPath(_)
            | RuleError::ConfigError(_) => PyValueError::new_err(message),
            RuleError::UnknownAttribute(_) | RuleError::RuleNotFound(_) => {
                PyKeyError::new_err(message)
            }
            RuleError::EvalError(EvalFailure::MissingAttribute(_)) => PyKeyError::new_err(message),
            RuleError::EvalError(EvalFailure::NonComparable(_)) => PyTypeError::new_err(message),
            RuleError::EvalError(EvalFailure::InvalidRecord(_)) => PyValueError::new_err(message),
            RuleError::StorageError(_) | RuleError::Io(_) | RuleError::Serialization(_) => {
                PyRuntimeError::new_err(message)
            }
        }
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleError>;
