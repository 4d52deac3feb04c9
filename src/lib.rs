//! Rule Engine Core - parse, combine and evaluate boolean attribute rules
//!
//! A rule is a string such as `age > 30 AND department = 'Sales'`. The
//! pipeline is tokenize → parse → (optionally) combine → evaluate:
//!
//! ```
//! use rule_engine_core::{build_rule, combine_rules, evaluate_rule, LogicalOperator, Record, Value};
//!
//! let senior = build_rule("age > 30").unwrap();
//! let sales = build_rule("department = 'Sales'").unwrap();
//! let rule = combine_rules(vec![senior, sales], LogicalOperator::And).unwrap();
//!
//! let data: Record = [
//!     ("age".to_string(), Value::from(35)),
//!     ("department".to_string(), Value::from("Sales")),
//! ]
//! .into();
//! assert!(evaluate_rule(&rule, &data).unwrap());
//! ```
//!
//! AND and OR share one precedence level and fold left to right, so
//! `a OR b AND c` means `(a OR b) AND c`.
//!
//! With the `python` feature the crate also builds a Python extension module.

pub mod config;
pub mod error;
pub mod rule;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use crate::config::EngineConfig;
pub use crate::error::{ErrorKind, EvalFailure, Result, RuleError};
pub use crate::rule::{
    AstNode, AttributeCatalog, Branch, Comparator, Condition, DataRecord, Literal,
    LogicalOperator, Record, Value,
};
pub use crate::store::{FileRuleStore, MemoryRuleStore, RuleStore};

/// Parse a rule string into an AST
///
/// Fails with `LexError` on an unrecognized character and `ParseError` on
/// malformed structure.
pub fn build_rule(text: &str) -> Result<AstNode> {
    rule::parse(text)
}

/// Fold parsed rules into one AST with `operator`
///
/// Fails with `CombineError` when `asts` is empty.
pub fn combine_rules<I>(asts: I, operator: LogicalOperator) -> Result<AstNode>
where
    I: IntoIterator<Item = AstNode>,
{
    rule::combine(asts, operator)
}

/// Evaluate a rule against a data record
///
/// Fails with `EvalError` on a missing attribute or an ordering comparison
/// between non-comparable values.
pub fn evaluate_rule<R: DataRecord + ?Sized>(ast: &AstNode, data: &R) -> Result<bool> {
    rule::evaluate(ast, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(age: i32, department: &str, salary: i32, experience: i32) -> Record {
        [
            ("age".to_string(), Value::from(age)),
            ("department".to_string(), Value::from(department)),
            ("salary".to_string(), Value::from(salary)),
            ("experience".to_string(), Value::from(experience)),
        ]
        .into()
    }

    #[test]
    fn test_public_pipeline() {
        let rule1 = build_rule(
            "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)",
        )
        .unwrap();
        let rule2 = build_rule(
            "((age > 30 AND department = 'Marketing')) AND (salary > 20000 OR experience > 5)",
        )
        .unwrap();
        let combined = combine_rules(vec![rule1, rule2], LogicalOperator::Or).unwrap();

        assert!(evaluate_rule(&combined, &employee(35, "Sales", 60000, 3)).unwrap());
        assert!(!evaluate_rule(&combined, &employee(22, "Marketing", 30000, 2)).unwrap());
        assert!(evaluate_rule(&combined, &employee(40, "Marketing", 25000, 6)).unwrap());
        assert!(!evaluate_rule(&combined, &employee(28, "HR", 40000, 4)).unwrap());
    }

    #[test]
    fn test_error_kinds_surface_through_api() {
        assert_eq!(build_rule("a = @").unwrap_err().kind(), ErrorKind::Lex);
        assert_eq!(build_rule("salary >").unwrap_err().kind(), ErrorKind::Parse);
        assert_eq!(
            combine_rules(Vec::new(), LogicalOperator::And)
                .unwrap_err()
                .kind(),
            ErrorKind::Combine
        );
        let ast = build_rule("x = 1").unwrap();
        assert_eq!(
            evaluate_rule(&ast, &Record::new()).unwrap_err().kind(),
            ErrorKind::Eval
        );
    }

    #[test]
    fn test_persisted_rule_round_trip() {
        let store = MemoryRuleStore::new();
        store.save("seniors", "age >= 60").unwrap();

        let ast = build_rule(&store.load("seniors").unwrap()).unwrap();
        assert!(evaluate_rule(&ast, &employee(61, "HR", 1, 1)).unwrap());
    }
}
