//! in-memory rule store
//!
//! rules are parsed once when added and the condition is cached alongside,
//! so repeated evaluations never re-parse the rule string.

use chrono::{DateTime, Utc};
use strsim::levenshtein;
use thiserror::Error;

use crate::conditions::{parse, Condition, ParseError};

use super::model::Rule;

/// error type for store operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("rule not found: '{0}'")]
    NotFound(String),
    #[error("a rule named '{0}' already exists")]
    DuplicateName(String),
    #[error("rule name must not be empty")]
    EmptyName,
    #[error("invalid rule '{name}': {source}")]
    InvalidRule {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("combining requires at least two rules")]
    NotEnoughRules,
}

/// a rule together with its cached parsed condition
#[derive(Debug, Clone)]
pub struct StoredRule {
    pub rule: Rule,
    pub condition: Condition,
}

/// in-memory collection of rules, ordered and keyed by sequential id
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<StoredRule>,
    next_id: u64,
}

impl RuleStore {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            next_id: 1,
        }
    }

    /// parse and add a rule, enforcing unique names
    pub fn add(
        &mut self,
        name: &str,
        description: &str,
        rule_string: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<&Rule, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let condition = parse(rule_string).map_err(|source| StoreError::InvalidRule {
            name: name.to_string(),
            source,
        })?;
        self.push(name, description, rule_string.trim(), condition, created_at)
    }

    fn push(
        &mut self,
        name: &str,
        description: &str,
        rule_string: &str,
        condition: Condition,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<&Rule, StoreError> {
        if self.find_by_name(name).is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let rule = Rule {
            id: self.next_id,
            name: name.to_string(),
            description: description.to_string(),
            rule_string: rule_string.to_string(),
            created_at,
        };
        self.next_id += 1;
        self.rules.push(StoredRule { rule, condition });
        Ok(&self.rules.last().expect("just pushed").rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// all rules in id order
    pub fn iter(&self) -> impl Iterator<Item = &StoredRule> {
        self.rules.iter()
    }

    /// a page of rules, mirroring list endpoints with skip/limit semantics
    pub fn page(&self, skip: usize, limit: Option<usize>) -> Vec<&StoredRule> {
        let iter = self.rules.iter().skip(skip);
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn get(&self, id: u64) -> Option<&StoredRule> {
        self.rules.iter().find(|sr| sr.rule.id == id)
    }

    fn find_by_name(&self, name: &str) -> Option<&StoredRule> {
        self.rules
            .iter()
            .find(|sr| sr.rule.name == name)
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|sr| sr.rule.name.eq_ignore_ascii_case(name))
            })
    }

    /// look a rule up by decimal id or by name (exact, then case-insensitive)
    pub fn find(&self, selector: &str) -> Option<&StoredRule> {
        if let Ok(id) = selector.parse::<u64>() {
            if let Some(found) = self.get(id) {
                return Some(found);
            }
        }
        self.find_by_name(selector)
    }

    /// remove a rule by selector, returning the removed rule
    pub fn remove(&mut self, selector: &str) -> Result<Rule, StoreError> {
        let id = self
            .find(selector)
            .map(|sr| sr.rule.id)
            .ok_or_else(|| StoreError::NotFound(selector.to_string()))?;
        let idx = self
            .rules
            .iter()
            .position(|sr| sr.rule.id == id)
            .expect("id came from find");
        Ok(self.rules.remove(idx).rule)
    }

    /// AND-fold the selected rules into a new stored rule
    ///
    /// the new rule string is each constituent string parenthesized and
    /// joined with AND, so it parses back to the combined condition.
    pub fn combine(
        &mut self,
        selectors: &[String],
        new_name: &str,
        description: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<&Rule, StoreError> {
        if selectors.len() < 2 {
            return Err(StoreError::NotEnoughRules);
        }

        let mut clauses = Vec::with_capacity(selectors.len());
        let mut parts = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let found = self
                .find(selector)
                .ok_or_else(|| StoreError::NotFound(selector.to_string()))?;
            clauses.push(found.condition.clone());
            parts.push(format!("({})", found.rule.rule_string));
        }

        let rule_string = parts.join(" AND ");
        let condition = Condition::All(clauses);

        let name = new_name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        self.push(name, description, &rule_string, condition, created_at)
    }

    /// rule names within the given edit distance of the query, closest first
    pub fn suggest(&self, query: &str, max_distance: usize) -> Vec<String> {
        suggest_names(
            query,
            self.rules.iter().map(|sr| sr.rule.name.as_str()),
            max_distance,
        )
    }
}

/// candidate names within the given edit distance of the query, closest
/// first - used for record field suggestions as well as rule names
pub fn suggest_names<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
    max_distance: usize,
) -> Vec<String> {
    let query = query.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .map(|name| (levenshtein(&query, &name.to_lowercase()), name))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored.into_iter().map(|(_, name)| name.to_string()).collect()
}
