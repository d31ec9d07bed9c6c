//! condition parsing and evaluation for rule strings
//!
//! a rule string is a comparison like `age > 18`, or comparisons combined
//! with AND/OR and parentheses:
//!
//! ```text
//! (age > 18 AND income > 50000) OR country == 'US'
//! ```
//!
//! `parse` turns the string into a [`Condition`]; `evaluate` tests it
//! against a [`Record`] of scalar values. both are pure functions returning
//! typed errors - nothing here performs I/O or panics on user input.

mod eval;
mod parser;
mod types;

pub use eval::{evaluate, EvalError, Record};
pub use parser::{parse, ParseError};
pub use types::{CompareOp, Comparison, Condition, Value};
