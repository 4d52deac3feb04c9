//! Command runner
//!
//! Turns parsed CLI arguments into calls on the public core operations and
//! the rule store, and prints the results.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use rule_engine_core::rule::{modify, parse_path, record_from_json};
use rule_engine_core::{
    combine_rules, evaluate_rule, AstNode, EngineConfig, FileRuleStore, LogicalOperator, Record,
    RuleStore,
};

use super::commands::{Commands, DataArgs, OptionalDataArgs};

/// Sample rules from the original HR demo
const DEMO_RULES: [&str; 2] = [
    "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)",
    "((age > 30 AND department = 'Marketing')) AND (salary > 20000 OR experience > 5)",
];

/// Sample employee records for the demo
const DEMO_DATA: [&str; 4] = [
    r#"{"age": 35, "department": "Sales", "salary": 60000, "experience": 3}"#,
    r#"{"age": 22, "department": "Marketing", "salary": 30000, "experience": 2}"#,
    r#"{"age": 40, "department": "Marketing", "salary": 25000, "experience": 6}"#,
    r#"{"age": 28, "department": "HR", "salary": 40000, "experience": 4}"#,
];

/// Executes CLI commands against a config and a rule store
pub struct CommandRunner {
    config: EngineConfig,
    store: FileRuleStore,
}

impl CommandRunner {
    pub fn new(config: EngineConfig, store: FileRuleStore) -> Self {
        Self { config, store }
    }

    /// Run a command, printing results to stdout
    pub fn run(&self, command: Commands) -> Result<()> {
        let stdout = io::stdout();
        self.execute(command, &mut stdout.lock())
    }

    /// Run a command, writing results to `out`
    pub fn execute<W: Write>(&self, command: Commands, out: &mut W) -> Result<()> {
        match command {
            Commands::Parse { rule, json } => {
                let ast = self.build(&rule)?;
                self.print_ast(&ast, json, out)
            }
            Commands::Eval { rule, data } => {
                let ast = self.build(&rule)?;
                let record = read_required_data(&data)?;
                writeln!(out, "{}", evaluate_rule(&ast, &record)?)?;
                Ok(())
            }
            Commands::Combine {
                rules,
                op,
                json,
                data,
            } => {
                let operator = op.map(LogicalOperator::from).unwrap_or(self.config.default_operator);
                let asts = rules
                    .iter()
                    .map(|rule| self.build(rule))
                    .collect::<Result<Vec<_>>>()?;
                let combined = combine_rules(asts, operator)?;
                info!(rules = rules.len(), operator = %operator, "combined rules");

                match read_optional_data(&data)? {
                    Some(record) => writeln!(out, "{}", evaluate_rule(&combined, &record)?)?,
                    None => self.print_ast(&combined, json, out)?,
                }
                Ok(())
            }
            Commands::Modify {
                rule,
                path,
                replacement,
            } => {
                let ast = self.build(&rule)?;
                let path = parse_path(&path)?;
                let replacement = self.build(&replacement)?;
                writeln!(out, "{}", modify(ast, &path, replacement)?)?;
                Ok(())
            }
            Commands::Save { name, rule } => {
                // Only rules that parse are persisted
                self.build(&rule)?;
                self.store.save(&name, &rule)?;
                writeln!(out, "Saved rule '{}'", name)?;
                Ok(())
            }
            Commands::Load { name, data } => {
                let rule = self.store.load(&name)?;
                match read_optional_data(&data)? {
                    Some(record) => {
                        let ast = self.build(&rule)?;
                        writeln!(out, "{}", evaluate_rule(&ast, &record)?)?;
                    }
                    None => writeln!(out, "{}", rule)?,
                }
                Ok(())
            }
            Commands::List => {
                for name in self.store.names()? {
                    writeln!(out, "{}", name)?;
                }
                Ok(())
            }
            Commands::Delete { name } => {
                self.store.delete(&name)?;
                writeln!(out, "Deleted rule '{}'", name)?;
                Ok(())
            }
            Commands::Demo => self.run_demo(out),
        }
    }

    /// Parse with the configured depth limit and validate against the catalog
    fn build(&self, rule: &str) -> Result<AstNode> {
        let ast = self
            .config
            .parser()
            .parse(rule)
            .with_context(|| format!("invalid rule: {}", rule))?;

        if let Some(catalog) = self.config.catalog() {
            catalog.validate(&ast)?;
        }

        debug!(conditions = ast.condition_count(), "rule built");
        Ok(ast)
    }

    fn print_ast<W: Write>(&self, ast: &AstNode, json: bool, out: &mut W) -> Result<()> {
        if json {
            // serde walks the tree recursively
            let depth = ast.depth();
            if depth > self.config.max_depth {
                bail!(
                    "AST depth {} exceeds max_depth {} for JSON output",
                    depth,
                    self.config.max_depth
                );
            }
            writeln!(out, "{}", serde_json::to_string_pretty(ast)?)?;
        } else {
            writeln!(out, "{}", ast)?;
        }
        Ok(())
    }

    fn run_demo<W: Write>(&self, out: &mut W) -> Result<()> {
        let asts = DEMO_RULES
            .iter()
            .map(|rule| self.build(rule))
            .collect::<Result<Vec<_>>>()?;

        for (i, ast) in asts.iter().enumerate() {
            writeln!(out, "AST for rule{}:\n{}\n", i + 1, ast)?;
        }

        let combined = combine_rules(asts, LogicalOperator::Or)?;
        writeln!(out, "Combined AST:\n{}", combined)?;

        for (i, raw) in DEMO_DATA.iter().enumerate() {
            let record = parse_record(raw)?;
            writeln!(
                out,
                "\nEvaluating data{}:\nResult: {}",
                i + 1,
                evaluate_rule(&combined, &record)?
            )?;
        }

        Ok(())
    }
}

fn read_required_data(args: &DataArgs) -> Result<Record> {
    load_record(args.data.as_deref(), args.data_file.as_deref())?
        .context("a data record is required (--data or --data-file)")
}

fn read_optional_data(args: &OptionalDataArgs) -> Result<Option<Record>> {
    load_record(args.data.as_deref(), args.data_file.as_deref())
}

fn load_record(inline: Option<&str>, file: Option<&Path>) -> Result<Option<Record>> {
    match (inline, file) {
        (Some(raw), _) => parse_record(raw).map(Some),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read data file {}", path.display()))?;
            parse_record(&raw).map(Some)
        }
        (None, None) => Ok(None),
    }
}

fn parse_record(raw: &str) -> Result<Record> {
    let json: serde_json::Value =
        serde_json::from_str(raw).context("data record is not valid JSON")?;
    Ok(record_from_json(&json)?)
}
