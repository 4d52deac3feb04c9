//! Rule evaluator

use crate::error::{EvalFailure, Result, RuleError};
use crate::rule::ast::{AstNode, Comparator, Condition, Literal, LogicalOperator};
use crate::rule::value::{DataRecord, Value};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Evaluate an AST against a data record
///
/// Evaluation never recurses. Descending a logical node pushes its operator and
/// right subtree onto one pending stack and continues down the left side. Once a
/// leaf yields a result, pending entries are popped: a short-circuiting entry
/// keeps the result, any other entry evaluates its right subtree, whose result
/// then stands for the whole logical node.
pub fn evaluate<R: DataRecord + ?Sized>(node: &AstNode, data: &R) -> Result<bool> {
    let mut pending: SmallVec<[(LogicalOperator, &AstNode); 16]> = SmallVec::new();
    let mut current = node;

    loop {
        let leaf = loop {
            match current {
                AstNode::Logical {
                    operator,
                    left,
                    right,
                } => {
                    pending.push((*operator, right.as_ref()));
                    current = left.as_ref();
                }
                AstNode::Condition(cond) => break cond,
            }
        };
        let result = check_condition(leaf, data)?;

        loop {
            match pending.pop() {
                None => return Ok(result),
                Some((LogicalOperator::And, _)) if !result => {}
                Some((LogicalOperator::Or, _)) if result => {}
                Some((_, right)) => {
                    current = right;
                    break;
                }
            }
        }
    }
}

/// Evaluate a single condition leaf
pub fn check_condition<R: DataRecord + ?Sized>(cond: &Condition, data: &R) -> Result<bool> {
    let actual = data.get_value(&cond.attribute).ok_or_else(|| {
        RuleError::EvalError(EvalFailure::MissingAttribute(cond.attribute.clone()))
    })?;

    compare(actual, cond.comparator, &cond.value).map_err(|_| {
        RuleError::EvalError(EvalFailure::NonComparable(format!(
            "'{}' is {} but '{}' needs an ordering against {}",
            cond.attribute,
            actual.type_name(),
            cond.comparator,
            cond.value
        )))
    })
}

/// Marker for an ordering comparison with no common domain
#[derive(Debug)]
pub struct NonComparable;

/// Apply a comparator to a data value and a literal
///
/// Equality never fails: numbers compare numerically, everything else by its
/// string rendering. Ordering needs two numbers or two genuine strings.
pub fn compare(
    actual: &Value,
    comparator: Comparator,
    expected: &Literal,
) -> std::result::Result<bool, NonComparable> {
    let numeric = match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    };

    match comparator {
        Comparator::Equal => Ok(values_equal(actual, expected, numeric)),
        Comparator::NotEqual => Ok(!values_equal(actual, expected, numeric)),
        Comparator::Greater => Ok(order(actual, expected, numeric)? == Ordering::Greater),
        Comparator::Less => Ok(order(actual, expected, numeric)? == Ordering::Less),
        Comparator::GreaterEqual => Ok(order(actual, expected, numeric)? != Ordering::Less),
        Comparator::LessEqual => Ok(order(actual, expected, numeric)? != Ordering::Greater),
    }
}

fn order(
    actual: &Value,
    expected: &Literal,
    numeric: Option<(f64, f64)>,
) -> std::result::Result<Ordering, NonComparable> {
    match (numeric, actual, expected) {
        (Some((a, b)), _, _) => a.partial_cmp(&b).ok_or(NonComparable),
        (None, Value::String(a), Literal::String(b)) => Ok(a.as_str().cmp(b.as_str())),
        _ => Err(NonComparable),
    }
}

fn values_equal(actual: &Value, expected: &Literal, numeric: Option<(f64, f64)>) -> bool {
    match numeric {
        Some((a, b)) => a == b,
        None => match (actual, expected) {
            (Value::String(a), Literal::String(b)) => a == b,
            _ => actual.to_string() == literal_text(expected),
        },
    }
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::String(s) => s.clone(),
        Literal::Number(_) => literal.to_string(),
    }
}
