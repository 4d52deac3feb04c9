//! Property tests for the rule module
//!
//! Covers parse idempotence, rendering round trips, combine/concatenate
//! equivalence, short-circuiting and comparator totality.

use proptest::prelude::*;

use crate::rule::ast::{AstNode, Comparator, Literal, LogicalOperator};
use crate::rule::cache::{check_rule, CACHE_TEST_LOCK};
use crate::rule::combiner::combine;
use crate::rule::evaluator::{compare, evaluate};
use crate::rule::parser::parse;
use crate::rule::value::{Record, Value};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Attribute names present in every generated record
fn attribute_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("age"), Just("salary"), Just("experience"), Just("level"),]
}

fn comparator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(">"),
        Just("<"),
        Just(">="),
        Just("<="),
        Just("="),
        Just("!="),
    ]
}

fn logic_strategy() -> impl Strategy<Value = LogicalOperator> {
    prop_oneof![Just(LogicalOperator::And), Just(LogicalOperator::Or)]
}

/// Numeric literal text, sometimes negative or fractional
fn number_literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (-20..=20i32).prop_map(|n| n.to_string()),
        (-200..=200i32).prop_map(|n| format!("{:.1}", n as f64 / 10.0)),
    ]
}

/// A single condition such as `age >= -3`
fn condition_strategy() -> impl Strategy<Value = String> {
    (attribute_strategy(), comparator_strategy(), number_literal_strategy())
        .prop_map(|(attr, op, value)| format!("{} {} {}", attr, op, value))
}

/// A rule built from conditions, AND/OR and optional grouping
fn rule_strategy() -> impl Strategy<Value = String> {
    condition_strategy().prop_recursive(4, 24, 2, |inner| {
        (inner.clone(), logic_strategy(), inner, any::<bool>()).prop_map(
            |(left, op, right, grouped)| {
                if grouped {
                    format!("({}) {} ({})", left, op, right)
                } else {
                    format!("{} {} {}", left, op, right)
                }
            },
        )
    })
}

/// Record with every attribute the rule strategy can reference
fn record_strategy() -> impl Strategy<Value = Record> {
    (-20..=20i32, -20..=20i32, -20..=20i32, -20..=20i32).prop_map(|(age, salary, exp, level)| {
        [
            ("age".to_string(), Value::from(age)),
            ("salary".to_string(), Value::from(salary)),
            ("experience".to_string(), Value::from(exp)),
            ("level".to_string(), Value::from(level)),
        ]
        .into()
    })
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Boolean),
        (-50..=50i32).prop_map(Value::from),
        "[a-z0-9]{0,4}".prop_map(Value::String),
    ]
}

fn literal_strategy() -> impl Strategy<Value = Literal> {
    prop_oneof![
        (-50..=50i32).prop_map(|n| Literal::Number(n as f64)),
        "[a-z0-9]{0,4}".prop_map(Literal::String),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Parsing the same text twice gives structurally equal trees
    #[test]
    fn prop_parse_is_idempotent(rule in rule_strategy()) {
        let first = parse(&rule).unwrap();
        let second = parse(&rule).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Rendering a tree and parsing it back is lossless
    #[test]
    fn prop_display_round_trip(rule in rule_strategy()) {
        let ast = parse(&rule).unwrap();
        let reparsed = parse(&ast.to_string()).unwrap();
        prop_assert_eq!(reparsed, ast);
    }

    /// Combining parsed rules equals parsing their grouped concatenation
    #[test]
    fn prop_combine_matches_concatenation(
        r1 in rule_strategy(),
        r2 in rule_strategy(),
        op in logic_strategy(),
        data in record_strategy()
    ) {
        let combined = combine(vec![parse(&r1).unwrap(), parse(&r2).unwrap()], op).unwrap();
        let concatenated = parse(&format!("({}) {} ({})", r1, op, r2)).unwrap();

        prop_assert_eq!(&combined, &concatenated);
        prop_assert_eq!(
            evaluate(&combined, &data).unwrap(),
            evaluate(&concatenated, &data).unwrap()
        );
    }

    /// A single trailing condition needs no grouping to be equivalent
    #[test]
    fn prop_combine_with_condition_matches_plain_concatenation(
        r1 in rule_strategy(),
        r2 in condition_strategy(),
        op in logic_strategy()
    ) {
        let combined = combine(vec![parse(&r1).unwrap(), parse(&r2).unwrap()], op).unwrap();
        let concatenated = parse(&format!("{} {} {}", r1, op, r2)).unwrap();
        prop_assert_eq!(combined, concatenated);
    }

    /// Left fold over many rules
    #[test]
    fn prop_combine_many_is_left_fold(
        rules in prop::collection::vec(condition_strategy(), 1..8),
        op in logic_strategy()
    ) {
        let asts: Vec<AstNode> = rules.iter().map(|r| parse(r).unwrap()).collect();
        let combined = combine(asts, op).unwrap();
        let joined = rules.join(&format!(" {} ", op));
        prop_assert_eq!(combined, parse(&joined).unwrap());
    }

    /// A false left side of AND never touches the right side's attributes
    #[test]
    fn prop_and_short_circuit(rule in rule_strategy(), data in record_strategy()) {
        let guarded = format!("age > 1000 AND ({})", rule.replace("age", "absent"));
        prop_assert_eq!(evaluate(&parse(&guarded).unwrap(), &data).unwrap(), false);

        let guarded = format!("age < 1000 OR ({})", rule.replace("age", "absent"));
        prop_assert_eq!(evaluate(&parse(&guarded).unwrap(), &data).unwrap(), true);
    }

    /// `=` and `!=` never fail and exactly one of them holds
    #[test]
    fn prop_equality_is_total(actual in value_strategy(), expected in literal_strategy()) {
        let eq = compare(&actual, Comparator::Equal, &expected);
        let ne = compare(&actual, Comparator::NotEqual, &expected);
        prop_assert!(eq.is_ok() && ne.is_ok());
        prop_assert_ne!(eq.unwrap(), ne.unwrap());
    }

    /// Numeric comparators agree with integer arithmetic
    #[test]
    fn prop_numeric_comparators(value in -20..=20i32, threshold in -20..=20i32) {
        let data: Record = [("level".to_string(), Value::from(value))].into();
        let check = |op: &str| evaluate(&parse(&format!("level {} {}", op, threshold)).unwrap(), &data).unwrap();

        prop_assert_eq!(check(">"), value > threshold);
        prop_assert_eq!(check("<"), value < threshold);
        prop_assert_eq!(check(">="), value >= threshold);
        prop_assert_eq!(check("<="), value <= threshold);
        prop_assert_eq!(check("="), value == threshold);
        prop_assert_eq!(check("!="), value != threshold);
    }

    /// Evaluation matches a direct boolean reading of AND/OR
    #[test]
    fn prop_logical_evaluation(a in -10..=10i32, b in -10..=10i32, ta in -10..=10i32, tb in -10..=10i32) {
        let data: Record = [
            ("age".to_string(), Value::from(a)),
            ("salary".to_string(), Value::from(b)),
        ]
        .into();

        let and_rule = parse(&format!("age >= {} AND salary >= {}", ta, tb)).unwrap();
        prop_assert_eq!(evaluate(&and_rule, &data).unwrap(), a >= ta && b >= tb);

        let or_rule = parse(&format!("age >= {} OR salary >= {}", ta, tb)).unwrap();
        prop_assert_eq!(evaluate(&or_rule, &data).unwrap(), a >= ta || b >= tb);
    }

    /// The cached path returns the same verdict as direct parsing
    #[test]
    fn prop_cache_consistency(rule in rule_strategy(), data in record_strategy()) {
        let _guard = CACHE_TEST_LOCK.lock();

        let direct = evaluate(&parse(&rule).unwrap(), &data).unwrap();
        let cached_first = check_rule(&rule, &data).unwrap();
        let cached_second = check_rule(&rule, &data).unwrap();

        prop_assert_eq!(direct, cached_first);
        prop_assert_eq!(cached_first, cached_second);
    }
}
