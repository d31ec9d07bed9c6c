//! rule model

use chrono::{DateTime, Utc};
use serde::Serialize;

/// a named, described rule string
///
/// ids are assigned sequentially when the store is built and are stable for
/// the lifetime of the process. rules are never mutated in place: replacing
/// one is a remove followed by an add.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub rule_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Rule {
    /// rule-string length, reported in detailed listings
    pub fn complexity(&self) -> usize {
        self.rule_string.len()
    }
}
