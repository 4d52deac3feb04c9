//! Path-based AST editing

use crate::error::{Result, RuleError};
use crate::rule::ast::AstNode;

/// One step down a logical node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Left,
    Right,
}

impl TryFrom<u8> for Branch {
    type Error = RuleError;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Branch::Left),
            1 => Ok(Branch::Right),
            other => Err(RuleError::InvalidPath(format!(
                "branch index must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Parse a comma-separated path such as `0,1,0`
pub fn parse_path(path: &str) -> Result<Vec<Branch>> {
    path.split(',')
        .map(|step| {
            let index: u8 = step.trim().parse().map_err(|_| {
                RuleError::InvalidPath(format!("invalid branch index '{}'", step.trim()))
            })?;
            Branch::try_from(index)
        })
        .collect()
}

impl AstNode {
    /// Subtree at `path`, or `None` if the path leaves the tree
    pub fn get(&self, path: &[Branch]) -> Option<&AstNode> {
        let mut current = self;
        for branch in path {
            current = match (current, branch) {
                (AstNode::Logical { left, .. }, Branch::Left) => left.as_ref(),
                (AstNode::Logical { right, .. }, Branch::Right) => right.as_ref(),
                (AstNode::Condition(_), _) => return None,
            };
        }
        Some(current)
    }

    fn child_mut(&mut self, branch: Branch) -> Option<&mut AstNode> {
        match (self, branch) {
            (AstNode::Logical { left, .. }, Branch::Left) => Some(left.as_mut()),
            (AstNode::Logical { right, .. }, Branch::Right) => Some(right.as_mut()),
            (AstNode::Condition(_), _) => None,
        }
    }
}

/// Replace the child at `path` with `replacement`
///
/// Every step but the last must land on a logical node, and the last step
/// names which child of that node is replaced. The root itself cannot be
/// replaced through a path.
pub fn modify(mut ast: AstNode, path: &[Branch], replacement: AstNode) -> Result<AstNode> {
    let (last, prefix) = path
        .split_last()
        .ok_or_else(|| RuleError::InvalidPath("path must not be empty".to_string()))?;

    let mut current = &mut ast;
    for (depth, branch) in prefix.iter().enumerate() {
        current = current.child_mut(*branch).ok_or_else(|| {
            RuleError::InvalidPath(format!("step {} descends into a condition", depth))
        })?;
    }

    let slot = current.child_mut(*last).ok_or_else(|| {
        RuleError::InvalidPath(format!("step {} descends into a condition", prefix.len()))
    })?;
    *slot = replacement;

    Ok(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ast::{Comparator, Literal};
    use crate::rule::parser::parse;

    const RULE: &str = "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)";

    #[test]
    fn test_replace_nested_condition() {
        let ast = parse(RULE).unwrap();
        let replacement = AstNode::condition("age", Comparator::Greater, Literal::Number(35.0));
        let path = parse_path("0,0,0").unwrap();

        let modified = modify(ast, &path, replacement.clone()).unwrap();
        assert_eq!(modified.get(&path), Some(&replacement));
        assert!(modified.to_string().starts_with("(((age > 35 AND department = 'Sales')"));
    }

    #[test]
    fn test_replace_with_subtree() {
        let ast = parse("a = 1 AND b = 2").unwrap();
        let modified = modify(ast, &[Branch::Right], parse("c = 3 OR d = 4").unwrap()).unwrap();
        assert_eq!(modified.to_string(), "(a = 1 AND (c = 3 OR d = 4))");
    }

    #[test]
    fn test_empty_path_fails() {
        let ast = parse("a = 1 AND b = 2").unwrap();
        let replacement = parse("c = 3").unwrap();
        assert!(matches!(
            modify(ast, &[], replacement),
            Err(RuleError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_path_through_condition_fails() {
        let ast = parse("a = 1 AND b = 2").unwrap();
        let replacement = parse("c = 3").unwrap();
        assert!(matches!(
            modify(ast, &[Branch::Left, Branch::Left], replacement),
            Err(RuleError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_path_rejects_bad_indices() {
        assert_eq!(
            parse_path("0, 1").unwrap(),
            vec![Branch::Left, Branch::Right]
        );
        assert!(matches!(parse_path("0,2"), Err(RuleError::InvalidPath(_))));
        assert!(matches!(parse_path("x"), Err(RuleError::InvalidPath(_))));
    }

    #[test]
    fn test_get_outside_tree() {
        let ast = parse("a = 1").unwrap();
        assert_eq!(ast.get(&[]), Some(&ast));
        assert!(ast.get(&[Branch::Left]).is_none());
    }
}
