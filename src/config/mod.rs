mod schema;

pub use schema::{Config, RuleDefinition, Settings, DEFAULT_FUZZY_THRESHOLD};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::conditions;
use crate::rules::{RuleStore, StoreError};

const CONFIG_ENV_VAR: &str = "RULEKIT_CONFIG";

pub fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    // default location: ~/.rulekit/rules.json
    dirs::home_dir()
        .expect("Could not find home directory")
        .join(".rulekit")
        .join("rules.json")
}

/// resolve the config path, preferring an explicit CLI override
pub fn resolve_path(override_path: Option<&Path>) -> PathBuf {
    match override_path {
        Some(path) => path.to_path_buf(),
        None => get_config_path(),
    }
}

pub fn load_with_override(override_path: Option<&Path>) -> Result<Config> {
    let path = resolve_path(override_path);

    if !path.exists() {
        // first run: write the default config so the file is there to edit
        let config = Config::default();
        save_to(&config, &path)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// build an in-memory rule store from the config's rule definitions
///
/// ids are assigned in file order, starting from 1.
pub fn build_store(config: &Config) -> Result<RuleStore, StoreError> {
    let mut store = RuleStore::new();
    for definition in &config.rules {
        store.add(
            &definition.name,
            &definition.description,
            &definition.rule,
            definition.created_at,
        )?;
    }
    Ok(store)
}

/// verify a config file and return a list of errors
///
/// collects every problem instead of stopping at the first, so a config
/// with several broken rules reports them all at once.
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    let mut errors = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for (i, definition) in config.rules.iter().enumerate() {
        let prefix = format!("rules[{}]", i);

        if definition.name.trim().is_empty() {
            errors.push(format!("{}: rule name must not be empty", prefix));
        } else if seen
            .iter()
            .any(|n| n.eq_ignore_ascii_case(&definition.name))
        {
            errors.push(format!(
                "{}: duplicate rule name '{}'",
                prefix, definition.name
            ));
        }
        seen.push(&definition.name);

        if let Err(e) = conditions::parse(&definition.rule) {
            errors.push(format!(
                "{}: invalid rule '{}': {}",
                prefix, definition.rule, e
            ));
        }
    }

    Ok(errors)
}
