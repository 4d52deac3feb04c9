//! Python bindings via PyO3
//!
//! Exposes the rule pipeline as a Python extension module. Rules cross the
//! boundary as opaque `Rule` handles holding the AST in Rust memory; data
//! records arrive as plain dicts of bool / int / float / str values.

use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict};

use crate::rule::{self, cache, AstNode, LogicalOperator, Record, Value};

// ============================================================================
// Rule PyClass
// ============================================================================

/// Parsed rule handle
#[pyclass(name = "Rule", frozen)]
pub struct PyRule {
    ast: AstNode,
}

#[pymethods]
impl PyRule {
    fn __repr__(&self) -> String {
        format!("Rule({})", self.ast)
    }

    fn __str__(&self) -> String {
        self.ast.to_string()
    }

    /// Evaluate this rule against a dict of attribute values
    fn evaluate(&self, data: &Bound<'_, PyDict>) -> PyResult<bool> {
        let record = extract_record(data)?;
        Ok(rule::evaluate(&self.ast, &record)?)
    }

    /// Distinct attribute names referenced by the rule
    fn attributes(&self) -> Vec<String> {
        self.ast.attributes().into_iter().map(String::from).collect()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a Python dict into a data record
fn extract_record(data: &Bound<'_, PyDict>) -> PyResult<Record> {
    let mut record = Record::with_capacity(data.len());
    for (key, value) in data.iter() {
        let name: String = key.extract()?;
        let value = extract_value(&name, &value)?;
        record.insert(name, value);
    }
    Ok(record)
}

fn extract_value(name: &str, obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    // bool must be checked first: Python bools are ints
    if obj.is_instance_of::<PyBool>() {
        return Ok(Value::Boolean(obj.extract()?));
    }
    if let Ok(n) = obj.extract::<f64>() {
        return Ok(Value::Number(n));
    }
    if let Ok(s) = obj.extract::<String>() {
        return Ok(Value::String(s));
    }
    Err(PyTypeError::new_err(format!(
        "unsupported value for '{}': expected bool, int, float or str",
        name
    )))
}

// ============================================================================
// Python Functions
// ============================================================================

/// Parse a rule string
#[pyfunction]
fn build_rule(text: &str) -> PyResult<PyRule> {
    Ok(PyRule {
        ast: rule::parse(text)?,
    })
}

/// Combine rules left to right with "AND" (default) or "OR"
#[pyfunction]
#[pyo3(signature = (rules, operator="AND"))]
fn combine_rules(rules: Vec<Bound<'_, PyRule>>, operator: &str) -> PyResult<PyRule> {
    let operator: LogicalOperator = operator.parse().map_err(PyValueError::new_err)?;
    let asts = rules.iter().map(|r| r.get().ast.clone());
    Ok(PyRule {
        ast: rule::combine(asts, operator)?,
    })
}

/// Evaluate a rule against a dict of attribute values
#[pyfunction]
fn evaluate_rule(rule: &Bound<'_, PyRule>, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    rule.get().evaluate(data)
}

/// Parse (through the shared cache) and evaluate a rule string in one call
#[pyfunction]
fn check_rule(text: &str, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    let record = extract_record(data)?;
    Ok(cache::check_rule(text, &record)?)
}

/// Drop every cached parse
#[pyfunction]
fn clear_rule_cache() {
    cache::clear_cache();
}

/// Evaluate a rule asynchronously
///
/// The evaluation runs on Tokio's blocking pool so the asyncio event loop
/// stays responsive while large combined rules are walked.
///
/// # Example (Python)
/// ```python
/// rule = build_rule("age > 30 AND department = 'Sales'")
/// ok = await evaluate_async(rule, {"age": 35, "department": "Sales"})
/// ```
#[pyfunction]
fn evaluate_async<'py>(
    py: Python<'py>,
    rule: &Bound<'py, PyRule>,
    data: &Bound<'py, PyDict>,
) -> PyResult<Bound<'py, PyAny>> {
    // Copy everything out of Python objects before leaving the GIL
    let ast = rule.get().ast.clone();
    let record = extract_record(data)?;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let verdict = tokio::task::spawn_blocking(move || rule::evaluate(&ast, &record))
            .await
            .map_err(|e| PyRuntimeError::new_err(format!("Evaluation task panicked: {}", e)))??;

        Ok(verdict)
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn rule_engine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_rule, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(check_rule, m)?)?;
    m.add_function(wrap_pyfunction!(clear_rule_cache, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_async, m)?)?;
    m.add_class::<PyRule>()?;
    Ok(())
}
