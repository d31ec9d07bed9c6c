//! core types for the condition system

use std::fmt;

/// comparison operators supported in rule strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// equality: ==, =
    Eq,
    /// inequality: !=
    Ne,
    /// greater than: >
    Gt,
    /// greater than or equal: >=
    Gte,
    /// less than: <
    Lt,
    /// less than or equal: <=
    Lte,
}

impl CompareOp {
    /// parse an operator token
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" | "=" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            _ => None,
        }
    }

    /// true for the operators that require numeric operands
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// a scalar value - used both for parsed literals and for record fields
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// string value
    String(String),
    /// integer value
    Number(i64),
    /// floating point value
    Float(f64),
    /// boolean value
    Bool(bool),
}

impl Value {
    /// true for Number and Float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Float(_))
    }

    /// numeric view of the value, promoting integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Float(_) => "number",
            Value::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // prefer single quotes; fall back when the string contains one
            Value::String(s) => {
                if s.contains('\'') {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "'{}'", s)
                }
            }
            Value::Number(n) => write!(f, "{}", n),
            // {:?} keeps the decimal point so the string re-parses as a float
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// a single field comparison - the leaf of every condition
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// field name looked up in the record (e.g. "age", "user.plan")
    pub field: String,
    /// comparison operator
    pub op: CompareOp,
    /// literal to compare against
    pub literal: Value,
}

impl Comparison {
    pub fn new(field: impl Into<String>, op: CompareOp, literal: Value) -> Self {
        Self {
            field: field.into(),
            op,
            literal,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.literal)
    }
}

/// the condition AST - a parsed rule string
///
/// the Display impl renders a canonical rule string that parses back to an
/// equal Condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// all clauses must hold (AND)
    All(Vec<Condition>),
    /// at least one clause must hold (OR)
    Any(Vec<Condition>),
    /// a field comparison
    Compare(Comparison),
}

impl Condition {
    /// number of comparison leaves in the tree
    pub fn clause_count(&self) -> usize {
        match self {
            Condition::All(cs) | Condition::Any(cs) => cs.iter().map(|c| c.clause_count()).sum(),
            Condition::Compare(_) => 1,
        }
    }

    /// render a child clause, parenthesizing nested logical groups
    fn fmt_clause(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare(_) => write!(f, "{}", self),
            _ => write!(f, "({})", self),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All(clauses) => {
                for (i, c) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    c.fmt_clause(f)?;
                }
                Ok(())
            }
            Condition::Any(clauses) => {
                for (i, c) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    c.fmt_clause(f)?;
                }
                Ok(())
            }
            Condition::Compare(cmp) => write!(f, "{}", cmp),
        }
    }
}
