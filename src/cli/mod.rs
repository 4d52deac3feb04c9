//! CLI module
//!
//! Subcommands:
//!
//! - `parse` / `eval` / `combine` / `modify` - work on rule strings directly
//! - `save` / `load` / `list` / `delete` - manage the JSON rule store
//! - `demo` - run the sample HR rules against sample records
//!
//! # Examples
//!
//! ```bash
//! rule-engine parse "age > 30 AND department = 'Sales'"
//! rule-engine eval "age > 30" --data '{"age": 35}'
//! rule-engine combine "age > 30" "salary > 50000" --op or
//! rule-engine save seniors "age >= 60" && rule-engine load seniors --data-file emp.json
//! ```

pub mod commands;
pub mod runner;

pub use commands::Cli;
pub use runner::CommandRunner;
