use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: vec![
                RuleDefinition {
                    name: "Age Rule".to_string(),
                    description: "Check if age is over 18".to_string(),
                    rule: "age > 18".to_string(),
                    created_at: None,
                },
                RuleDefinition {
                    name: "Income Rule".to_string(),
                    description: "Check if income is over 50000".to_string(),
                    rule: "income > 50000".to_string(),
                    created_at: None,
                },
            ],
            settings: Settings::default(),
        }
    }
}

/// a rule as stored in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub const DEFAULT_FUZZY_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// maximum edit distance for "did you mean" suggestions
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: usize,
}

fn default_fuzzy_threshold() -> usize {
    DEFAULT_FUZZY_THRESHOLD
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}
