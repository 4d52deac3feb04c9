//! Abstract Syntax Tree for rule expressions

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// AST node for rule expressions
///
/// Parsed chains lean left and can be arbitrarily long, so `Clone`,
/// `PartialEq`, `Display` and `Drop` walk the tree with explicit stacks
/// instead of recursing through the boxes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AstNode {
    /// Single comparison like `age > 30`
    Condition(Condition),
    /// AND / OR over exactly two subtrees
    Logical {
        operator: LogicalOperator,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

/// Leaf comparison of one attribute against a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub attribute: String,
    pub comparator: Comparator,
    pub value: Literal,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Equal (=)
    #[serde(rename = "=")]
    Equal,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    NotEqual,
    /// Greater than (>)
    #[serde(rename = ">")]
    Greater,
    /// Less than (<)
    #[serde(rename = "<")]
    Less,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    LessEqual,
}

/// Boolean connectives. AND and OR share one precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// Literal on the right-hand side of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::GreaterEqual => ">=",
            Comparator::LessEqual => "<=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Comparator::Equal),
            "!=" => Some(Comparator::NotEqual),
            ">" => Some(Comparator::Greater),
            "<" => Some(Comparator::Less),
            ">=" => Some(Comparator::GreaterEqual),
            "<=" => Some(Comparator::LessEqual),
            _ => None,
        }
    }

    /// True for `<`, `>`, `<=`, `>=`
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Comparator::Equal | Comparator::NotEqual)
    }
}

impl LogicalOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("AND") {
            Some(LogicalOperator::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(LogicalOperator::Or)
        } else {
            None
        }
    }
}

impl std::str::FromStr for LogicalOperator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LogicalOperator::from_keyword(s.trim())
            .ok_or_else(|| format!("unknown logical operator '{}', expected AND or OR", s))
    }
}

impl Literal {
    /// Numeric view of the literal; quoted strings count when they parse as a finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::String(s) => parse_finite(s),
        }
    }
}

/// Parse a string as a finite f64, rejecting `inf` / `nan` spellings
pub(crate) fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number without a trailing `.0` when it is integral
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl AstNode {
    pub fn condition(attribute: impl Into<String>, comparator: Comparator, value: Literal) -> Self {
        AstNode::Condition(Condition {
            attribute: attribute.into(),
            comparator,
            value,
        })
    }

    pub fn logical(operator: LogicalOperator, left: AstNode, right: AstNode) -> Self {
        AstNode::Logical {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_condition(&self) -> bool {
        matches!(self, AstNode::Condition(_))
    }

    /// Number of condition leaves
    pub fn condition_count(&self) -> usize {
        let mut count = 0;
        self.visit_conditions(&mut |_| count += 1);
        count
    }

    /// Distinct attribute names in first-seen order
    pub fn attributes(&self) -> Vec<&str> {
        let mut seen = AHashSet::new();
        let mut ordered = Vec::new();
        self.visit_conditions(&mut |cond| {
            if seen.insert(cond.attribute.as_str()) {
                ordered.push(cond.attribute.as_str());
            }
        });
        ordered
    }

    /// Number of nodes on the longest root-to-leaf path; a lone condition is 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let AstNode::Logical { left, right, .. } = node {
                stack.push((right.as_ref(), level + 1));
                stack.push((left.as_ref(), level + 1));
            }
        }
        deepest
    }

    /// Visit every condition leaf left to right
    pub fn visit_conditions<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Condition),
    {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                AstNode::Condition(cond) => f(cond),
                AstNode::Logical { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}

impl AstNode {
    /// Leaf used to fill a box whose contents were moved out
    fn placeholder() -> Self {
        AstNode::Condition(Condition {
            attribute: String::new(),
            comparator: Comparator::Equal,
            value: Literal::Number(0.0),
        })
    }

    /// Copy of this node with placeholder children
    fn shallow_clone(&self) -> Self {
        match self {
            AstNode::Condition(cond) => AstNode::Condition(cond.clone()),
            AstNode::Logical { operator, .. } => {
                AstNode::logical(*operator, AstNode::placeholder(), AstNode::placeholder())
            }
        }
    }

    /// Move logical children out of `self` onto `pending`
    fn detach_children(&mut self, pending: &mut Vec<AstNode>) {
        if let AstNode::Logical { left, right, .. } = self {
            for child in [left, right] {
                if !child.is_condition() {
                    pending.push(std::mem::replace(child.as_mut(), AstNode::placeholder()));
                }
            }
        }
    }
}

impl Clone for AstNode {
    fn clone(&self) -> Self {
        let mut root = self.shallow_clone();
        {
            let mut pending: Vec<(&AstNode, &mut AstNode)> = vec![(self, &mut root)];
            while let Some((source, target)) = pending.pop() {
                if let (
                    AstNode::Logical { left, right, .. },
                    AstNode::Logical {
                        left: new_left,
                        right: new_right,
                        ..
                    },
                ) = (source, target)
                {
                    **new_left = left.shallow_clone();
                    **new_right = right.shallow_clone();
                    pending.push((right.as_ref(), new_right.as_mut()));
                    pending.push((left.as_ref(), new_left.as_mut()));
                }
            }
        }
        root
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (AstNode::Condition(a), AstNode::Condition(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    AstNode::Logical {
                        operator: op_a,
                        left: left_a,
                        right: right_a,
                    },
                    AstNode::Logical {
                        operator: op_b,
                        left: left_b,
                        right: right_b,
                    },
                ) => {
                    if op_a != op_b {
                        return false;
                    }
                    pending.push((right_a.as_ref(), right_b.as_ref()));
                    pending.push((left_a.as_ref(), left_b.as_ref()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) if s.contains('\'') => write!(f, "\"{}\"", s),
            Literal::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.comparator, self.value)
    }
}

enum Piece<'a> {
    Node(&'a AstNode),
    Operator(LogicalOperator),
    Close,
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Node(AstNode::Condition(cond)) => write!(f, "{}", cond)?,
                Piece::Node(AstNode::Logical {
                    operator,
                    left,
                    right,
                }) => {
                    f.write_str("(")?;
                    pending.push(Piece::Close);
                    pending.push(Piece::Node(right));
                    pending.push(Piece::Operator(*operator));
                    pending.push(Piece::Node(left));
                }
                Piece::Operator(operator) => write!(f, " {} ", operator)?,
                Piece::Close => f.write_str(")")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_rule_syntax() {
        let ast = AstNode::logical(
            LogicalOperator::And,
            AstNode::condition("age", Comparator::Greater, Literal::Number(30.0)),
            AstNode::condition("department", Comparator::Equal, Literal::String("Sales".into())),
        );
        assert_eq!(ast.to_string(), "(age > 30 AND department = 'Sales')");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(Literal::Number(5.0).to_string(), "5");
        assert_eq!(Literal::Number(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn test_attributes_are_distinct_and_ordered() {
        let ast = AstNode::logical(
            LogicalOperator::Or,
            AstNode::logical(
                LogicalOperator::And,
                AstNode::condition("age", Comparator::Greater, Literal::Number(30.0)),
                AstNode::condition("salary", Comparator::Less, Literal::Number(10.0)),
            ),
            AstNode::condition("age", Comparator::Less, Literal::Number(18.0)),
        );
        assert_eq!(ast.attributes(), vec!["age", "salary"]);
        assert_eq!(ast.condition_count(), 3);
    }

    #[test]
    fn test_attributes_on_wide_rule() {
        let ast = (0..20_000).fold(
            AstNode::condition("a0", Comparator::Equal, Literal::Number(0.0)),
            |node, i| {
                AstNode::logical(
                    LogicalOperator::Or,
                    node,
                    AstNode::condition(format!("a{}", i % 5000), Comparator::Equal, Literal::Number(1.0)),
                )
            },
        );
        let attributes = ast.attributes();
        assert_eq!(attributes.len(), 5000);
        assert_eq!(attributes[0], "a0");
        assert_eq!(attributes[4999], "a4999");
    }

    #[test]
    fn test_keyword_lookup_is_case_insensitive() {
        assert_eq!(LogicalOperator::from_keyword("and"), Some(LogicalOperator::And));
        assert_eq!(LogicalOperator::from_keyword("Or"), Some(LogicalOperator::Or));
        assert_eq!(LogicalOperator::from_keyword("xor"), None);
        assert_eq!("or".parse::<LogicalOperator>(), Ok(LogicalOperator::Or));
    }

    #[test]
    fn test_comparator_symbols() {
        for sym in ["=", "!=", ">", "<", ">=", "<="] {
            let cmp = Comparator::from_symbol(sym).unwrap();
            assert_eq!(cmp.symbol(), sym);
        }
        assert!(Comparator::from_symbol("==").is_none());
        assert!(Comparator::Greater.is_ordering());
        assert!(!Comparator::NotEqual.is_ordering());
    }

    fn long_chain(n: usize) -> AstNode {
        (1..n).fold(
            AstNode::condition("v", Comparator::Equal, Literal::Number(0.0)),
            |node, i| {
                AstNode::logical(
                    LogicalOperator::And,
                    node,
                    AstNode::condition("v", Comparator::Equal, Literal::Number(i as f64)),
                )
            },
        )
    }

    #[test]
    fn test_long_chain_clone_compare_display_drop() {
        let ast = long_chain(200_000);
        let copy = ast.clone();
        assert!(ast == copy);
        assert_eq!(copy.condition_count(), 200_000);
        assert_eq!(ast.depth(), 200_000);

        let text = ast.to_string();
        assert!(text.starts_with("(((("));
        assert!(text.ends_with("AND v = 199999)"));

        drop(ast);
        drop(copy);
    }

    #[test]
    fn test_clone_is_deep_and_equal() {
        let ast = AstNode::logical(
            LogicalOperator::Or,
            AstNode::condition("age", Comparator::Greater, Literal::Number(30.0)),
            AstNode::logical(
                LogicalOperator::And,
                AstNode::condition("dept", Comparator::Equal, Literal::String("Sales".into())),
                AstNode::condition("salary", Comparator::GreaterEqual, Literal::Number(5.0)),
            ),
        );
        let copy = ast.clone();
        assert_eq!(copy, ast);
        assert_eq!(copy.to_string(), "(age > 30 OR (dept = 'Sales' AND salary >= 5))");
        assert_eq!(copy.depth(), 3);

        let other = AstNode::logical(
            LogicalOperator::And,
            AstNode::condition("age", Comparator::Greater, Literal::Number(30.0)),
            AstNode::condition("dept", Comparator::Equal, Literal::String("Sales".into())),
        );
        assert_ne!(copy, other);
    }
}
