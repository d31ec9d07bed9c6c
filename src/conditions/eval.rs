//! condition evaluator
//!
//! evaluates a parsed condition against a flat record of scalar values

use std::collections::HashMap;

use thiserror::Error;

use super::types::{CompareOp, Comparison, Condition, Value};

/// the record a condition is evaluated against: field name -> scalar value
pub type Record = HashMap<String, Value>;

/// error type for evaluating a syntactically valid condition
///
/// each variant is a machine-checkable reason code; the Display form is the
/// reason string shown to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// the record has no value for the compared field
    #[error("field not found: '{0}'")]
    FieldNotFound(String),
    /// an ordering operator was applied to a non-numeric operand
    #[error("type mismatch: '{field}' ({found}) cannot be ordered against {expected} with '{op}'")]
    TypeMismatch {
        field: String,
        op: CompareOp,
        found: &'static str,
        expected: &'static str,
    },
}

/// evaluate a condition against the given record
///
/// logical clauses evaluate left to right and short-circuit, so an error in
/// a clause past the deciding one is not reported.
pub fn evaluate(condition: &Condition, record: &Record) -> Result<bool, EvalError> {
    match condition {
        Condition::All(clauses) => {
            // empty AND is vacuously true
            for clause in clauses {
                if !evaluate(clause, record)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Any(clauses) => {
            // empty OR is false
            for clause in clauses {
                if evaluate(clause, record)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Compare(cmp) => evaluate_comparison(cmp, record),
    }
}

fn evaluate_comparison(cmp: &Comparison, record: &Record) -> Result<bool, EvalError> {
    let actual = record
        .get(&cmp.field)
        .ok_or_else(|| EvalError::FieldNotFound(cmp.field.clone()))?;

    if cmp.op.is_ordering() {
        return compare_ordered(cmp, actual);
    }

    let equal = values_equal(actual, &cmp.literal);
    match cmp.op {
        CompareOp::Eq => Ok(equal),
        CompareOp::Ne => Ok(!equal),
        _ => unreachable!("ordering operators handled above"),
    }
}

/// ordering operators require both operands numeric; IEEE semantics apply,
/// with an exact integer comparison when neither side is a float
fn compare_ordered(cmp: &Comparison, actual: &Value) -> Result<bool, EvalError> {
    if !actual.is_numeric() || !cmp.literal.is_numeric() {
        return Err(EvalError::TypeMismatch {
            field: cmp.field.clone(),
            op: cmp.op,
            found: actual.type_name(),
            expected: cmp.literal.type_name(),
        });
    }

    if let (Value::Number(a), Value::Number(b)) = (actual, &cmp.literal) {
        return Ok(match cmp.op {
            CompareOp::Gt => a > b,
            CompareOp::Gte => a >= b,
            CompareOp::Lt => a < b,
            CompareOp::Lte => a <= b,
            _ => unreachable!(),
        });
    }

    let a = actual.as_f64().expect("checked numeric above");
    let b = cmp.literal.as_f64().expect("checked numeric above");
    Ok(match cmp.op {
        CompareOp::Gt => a > b,
        CompareOp::Gte => a >= b,
        CompareOp::Lt => a < b,
        CompareOp::Lte => a <= b,
        _ => unreachable!(),
    })
}

/// value equality within matching type families; across families the values
/// are simply unequal, never an error
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ if a.is_numeric() && b.is_numeric() => {
            if let (Value::Number(x), Value::Number(y)) = (a, b) {
                x == y
            } else {
                // promotes integers, so 18 == 18.0
                a.as_f64() == b.as_f64()
            }
        }
        _ => false,
    }
}
