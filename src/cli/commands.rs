//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use rule_engine_core::LogicalOperator;
use std::path::PathBuf;

/// Parse, combine and evaluate attribute rules
#[derive(Parser, Debug)]
#[command(name = "rule-engine")]
#[command(version, about = "Rule expression engine")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Engine config file (JSON)
    #[arg(short, long, default_value = "rule-engine.json", global = true)]
    pub config: PathBuf,

    /// Rule store file, overriding the config's store_path
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a rule and print its AST
    Parse {
        rule: String,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a rule against a data record
    Eval {
        rule: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Combine several rules into one AST
    Combine {
        #[arg(required = true, num_args = 1..)]
        rules: Vec<String>,

        /// Combining operator; defaults to the config's default_operator
        #[arg(long, value_enum)]
        op: Option<OperatorArg>,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        data: OptionalDataArgs,
    },

    /// Replace a subtree of a rule
    Modify {
        rule: String,

        /// Branch indices from the root, 0 = left and 1 = right (e.g. "0,0,1")
        #[arg(long)]
        path: String,

        /// Replacement rule
        #[arg(long = "with")]
        replacement: String,
    },

    /// Validate and save a rule under a name
    Save { name: String, rule: String },

    /// Print a saved rule, optionally evaluating it
    Load {
        name: String,

        #[command(flatten)]
        data: OptionalDataArgs,
    },

    /// List saved rule names
    List,

    /// Delete a saved rule
    Delete { name: String },

    /// Run the sample rules against sample employee records
    Demo,
}

/// Required data record
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DataArgs {
    /// Data record as a JSON object
    #[arg(short, long)]
    pub data: Option<String>,

    /// File containing a JSON object data record
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

/// Optional data record
#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
pub struct OptionalDataArgs {
    /// Data record as a JSON object
    #[arg(short, long)]
    pub data: Option<String>,

    /// File containing a JSON object data record
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OperatorArg {
    And,
    Or,
}

impl From<OperatorArg> for LogicalOperator {
    fn from(op: OperatorArg) -> Self {
        match op {
            OperatorArg::And => LogicalOperator::And,
            OperatorArg::Or => LogicalOperator::Or,
        }
    }
}
