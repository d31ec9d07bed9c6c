//! rule string parser - converts free text to a condition AST
//!
//! grammar (AND binds tighter than OR, keywords are case-insensitive):
//!
//! ```text
//! expression := and_chain ( OR and_chain )*
//! and_chain  := primary ( AND primary )*
//! primary    := '(' expression ')' | comparison
//! comparison := <field> <operator> <literal>
//! ```
//!
//! whitespace is insignificant: `age>18` and `age > 18` parse identically.
//! literals are typed in order: boolean, integer, float, else string.
//! quoted literals ('...' or "...") are always strings.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::types::{CompareOp, Comparison, Condition, Value};

/// error type for parsing rule strings
///
/// each variant is a machine-checkable reason code; the Display form is the
/// reason string shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// no recognized operator token where one is required
    #[error("missing operator")]
    MissingOperator,
    /// a comparison starts with an operator instead of a field
    #[error("empty field name")]
    EmptyFieldName,
    /// nothing usable follows the operator
    #[error("empty literal")]
    EmptyLiteral,
    /// an opened group is never closed
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    /// a logical keyword is not followed by a clause
    #[error("expected expression")]
    ExpectedExpression,
    /// input continues after a complete expression
    #[error("unexpected trailing input: '{0}'")]
    TrailingInput(String),
}

lazy_static! {
    // token pattern, longest-match-first: quoted strings, two-character
    // operators before one-character ones, parens, then bare words
    // (dots for nested field names, leading '-' for negative numbers).
    // anything else is skipped.
    static ref TOKEN_RE: Regex =
        Regex::new(r#"'[^']*'|"[^"]*"|>=|<=|==|!=|[=()<>]|[-\w.]+"#).unwrap();
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Op(CompareOp),
    Word(String),
    Quoted(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Op(op) => op.to_string(),
            Token::Word(w) => w.clone(),
            Token::Quoted(q) => format!("'{}'", q),
        }
    }
}

fn is_keyword(word: &str) -> bool {
    word.eq_ignore_ascii_case("AND") || word.eq_ignore_ascii_case("OR")
}

fn lex(input: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(input)
        .map(|m| {
            let text = m.as_str();
            match text {
                "(" => Token::LParen,
                ")" => Token::RParen,
                _ => {
                    if let Some(op) = CompareOp::parse(text) {
                        Token::Op(op)
                    } else if text.starts_with('\'') || text.starts_with('"') {
                        Token::Quoted(text[1..text.len() - 1].to_string())
                    } else {
                        Token::Word(text.to_string())
                    }
                }
            }
        })
        .collect()
}

/// type an unquoted literal token: boolean, integer, float, else string
fn infer_literal(word: &str) -> Value {
    if word.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if word.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = word.parse::<i64>() {
        return Value::Number(n);
    }
    // require a digit so words like "inf" stay strings
    if word.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(f) = word.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(word.to_string())
}

/// parse a rule string into a condition AST
///
/// pure function of the input: the same string always yields the same
/// result, with no state retained between calls.
pub fn parse(rule_string: &str) -> Result<Condition, ParseError> {
    let tokens = lex(rule_string);

    // covers the empty string and operator-free input like "age 18"
    if !tokens.iter().any(|t| matches!(t, Token::Op(_))) {
        return Err(ParseError::MissingOperator);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let condition = parser.expression()?;

    if let Some(token) = parser.tokens.get(parser.pos) {
        return Err(ParseError::TrailingInput(token.describe()));
    }

    Ok(condition)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if let Some(Token::Word(w)) = self.tokens.get(self.pos) {
            if w.eq_ignore_ascii_case(keyword) {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn expression(&mut self) -> Result<Condition, ParseError> {
        let mut clauses = vec![self.and_chain()?];
        while self.eat_keyword("OR") {
            clauses.push(self.and_chain()?);
        }
        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Condition::Any(clauses))
        }
    }

    fn and_chain(&mut self) -> Result<Condition, ParseError> {
        let mut clauses = vec![self.primary()?];
        while self.eat_keyword("AND") {
            clauses.push(self.primary()?);
        }
        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Condition::All(clauses))
        }
    }

    fn primary(&mut self) -> Result<Condition, ParseError> {
        if matches!(self.tokens.get(self.pos), Some(Token::LParen)) {
            self.pos += 1;
            let inner = self.expression()?;
            return match self.next() {
                Some(Token::RParen) => Ok(inner),
                _ => Err(ParseError::UnbalancedParens),
            };
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Condition, ParseError> {
        let field = match self.next() {
            Some(Token::Word(w)) if !is_keyword(&w) => w,
            Some(Token::Quoted(q)) => q,
            Some(Token::Op(_)) => return Err(ParseError::EmptyFieldName),
            _ => return Err(ParseError::ExpectedExpression),
        };

        let op = match self.next() {
            Some(Token::Op(op)) => op,
            _ => return Err(ParseError::MissingOperator),
        };

        let literal = match self.next() {
            Some(Token::Word(w)) if !is_keyword(&w) => infer_literal(&w),
            Some(Token::Quoted(q)) => Value::String(q),
            _ => return Err(ParseError::EmptyLiteral),
        };

        Ok(Condition::Compare(Comparison::new(field, op, literal)))
    }
}
