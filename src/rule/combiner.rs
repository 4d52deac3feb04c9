//! Rule combiner

use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, LogicalOperator};
use tracing::debug;

/// Fold rules left to right: `((r0 op r1) op r2) op ...`
///
/// The fold has the same shape the parser produces for `(r0) op (r1) op (r2)`,
/// so a combined rule evaluates exactly like the concatenated source.
pub fn combine<I>(asts: I, operator: LogicalOperator) -> Result<AstNode>
where
    I: IntoIterator<Item = AstNode>,
{
    let mut iter = asts.into_iter();
    let first = iter.next().ok_or_else(|| {
        RuleError::CombineError("cannot combine an empty list of rules".to_string())
    })?;

    let mut count = 1usize;
    let combined = iter.fold(first, |acc, next| {
        count += 1;
        AstNode::logical(operator, acc, next)
    });

    debug!(rules = count, operator = %operator, "combined rules");
    Ok(combined)
}

/// Combine with the default operator (AND)
pub fn combine_all<I>(asts: I) -> Result<AstNode>
where
    I: IntoIterator<Item = AstNode>,
{
    combine(asts, LogicalOperator::default())
}
