use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::conditions::{self, Condition, EvalError, Record, Value};
use crate::config::{self, Config, RuleDefinition};
use crate::rules::{suggest_names, Rule, RuleStore, StoreError};
use crate::version::Version;

use super::exit_codes;
use super::output::{self, OutputMode};

#[derive(Parser)]
#[command(name = "rulekit")]
#[command(about = "A rule-condition engine with a scriptable CLI")]
#[command(version)]
pub struct Cli {
    /// Path to rules file (overrides RULEKIT_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a rule expression and print its normalized form
    Check {
        /// Rule expression, e.g. "age > 18 AND income > 50000"
        expression: String,
    },

    /// Evaluate rules against a JSON record
    Eval {
        /// Rule names or ids to evaluate (default: every rule in the rules file)
        rule: Vec<String>,

        /// Ad-hoc expression to evaluate instead of stored rules
        #[arg(long, conflicts_with = "rule")]
        expr: Option<String>,

        /// Record JSON: inline object, @file, or '-' for stdin
        #[arg(short, long)]
        data: String,
    },

    /// Manage rules in the rules file
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List rules
    List {
        /// Output in JSON format (overrides global --json for this command)
        #[arg(long)]
        json: bool,

        /// Output one name per line (ideal for piping to fzf/xargs)
        #[arg(long, conflicts_with = "json")]
        names: bool,

        /// Custom output format using {field} placeholders (e.g., "{id}: {rule_string}")
        #[arg(long, conflicts_with_all = ["json", "names"])]
        format: Option<String>,

        /// Include description, rule string, and complexity
        #[arg(short, long)]
        detailed: bool,

        /// Skip the first N rules
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Show at most N rules
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a single rule
    Show {
        /// Rule name or id
        rule: String,
    },

    /// Add a new rule
    Add {
        /// Rule name (must be unique)
        #[arg(short, long)]
        name: String,

        /// Rule description
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Rule expression, e.g. "age > 18"
        expression: String,
    },

    /// Remove a rule
    Remove {
        /// Rule name or id
        rule: String,
    },

    /// Combine rules into a new rule that requires all of them
    Combine {
        /// Name for the combined rule
        #[arg(short, long)]
        name: String,

        /// Description for the combined rule
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Rules to combine (names or ids)
        #[arg(required = true, num_args = 2..)]
        rules: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Verify the rules file for errors
    Verify,
    /// Show the default configuration with example rules
    Default,
}

// JSON output structs

#[derive(Serialize)]
struct ListResponse<T: Serialize> {
    items: Vec<T>,
    total: usize,
}

#[derive(Serialize)]
struct RuleSummary {
    id: u64,
    name: String,
}

#[derive(Serialize, Clone)]
struct RuleDetailed {
    id: u64,
    name: String,
    description: String,
    rule_string: String,
    complexity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl From<&Rule> for RuleDetailed {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id,
            name: rule.name.clone(),
            description: rule.description.clone(),
            rule_string: rule.rule_string.clone(),
            complexity: rule.complexity(),
            created_at: rule.created_at,
        }
    }
}

#[derive(Serialize)]
struct CheckData {
    action: &'static str,
    expression: String,
    normalized: String,
    clauses: usize,
}

#[derive(Serialize)]
struct Verdict {
    rule: String,
    passed: bool,
}

#[derive(Serialize)]
struct EvalData {
    action: &'static str,
    passed: bool,
    results: Vec<Verdict>,
}

#[derive(Serialize)]
struct RuleChangeData {
    action: &'static str,
    rule: RuleDetailed,
}

#[derive(Serialize)]
struct CombineData {
    action: &'static str,
    rule: RuleDetailed,
    combined_from: Vec<String>,
}

#[derive(Serialize)]
struct PathData {
    path: String,
}

#[derive(Serialize)]
struct VerifyData {
    valid: bool,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct VersionData {
    version: String,
    commit: String,
    channel: String,
    build_date: String,
}

/// report an error in the active output mode and exit with the given code
fn fail(mode: OutputMode, code: i32, message: &str, suggestions: Vec<String>) -> ! {
    if mode.is_json() {
        output::print_json_error(code, message, suggestions);
    } else {
        eprintln!("Error: {}", message);
        if !suggestions.is_empty() {
            eprintln!("Did you mean: {}?", suggestions.join(", "));
        }
    }
    std::process::exit(code);
}

fn store_error_code(error: &StoreError) -> i32 {
    match error {
        StoreError::NotFound(_) => exit_codes::RULE_NOT_FOUND,
        StoreError::InvalidRule { .. } => exit_codes::PARSE_ERROR,
        StoreError::DuplicateName(_) | StoreError::EmptyName | StoreError::NotEnoughRules => {
            exit_codes::INVALID_ARGS
        }
    }
}

fn load_config_or_fail(mode: OutputMode, override_path: Option<&std::path::Path>) -> Config {
    match config::load_with_override(override_path) {
        Ok(config) => config,
        Err(e) => fail(mode, exit_codes::CONFIG_ERROR, &format!("{:#}", e), vec![]),
    }
}

fn build_store_or_fail(mode: OutputMode, config: &Config) -> RuleStore {
    match config::build_store(config) {
        Ok(store) => store,
        Err(e) => fail(mode, exit_codes::CONFIG_ERROR, &e.to_string(), vec![]),
    }
}

fn save_config_or_fail(mode: OutputMode, config: &Config, path: &std::path::Path) {
    if let Err(e) = config::save_to(config, path) {
        fail(mode, exit_codes::CONFIG_ERROR, &format!("{:#}", e), vec![]);
    }
}

/// resolve the --data argument: inline JSON, @file, or '-' for stdin
fn read_data_arg(data: &str) -> Result<String> {
    if data == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read record from stdin")?;
        Ok(buffer)
    } else if let Some(path) = data.strip_prefix('@') {
        fs::read_to_string(path).with_context(|| format!("failed to read record file: {}", path))
    } else {
        Ok(data.to_string())
    }
}

/// decode a JSON object with scalar values into an evaluation record
fn decode_record(raw: &str) -> std::result::Result<Record, String> {
    let json: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid record JSON: {}", e))?;

    let object = match json.as_object() {
        Some(object) => object,
        None => return Err("record must be a JSON object".to_string()),
    };

    let mut record = Record::new();
    for (key, value) in object {
        let value = match value {
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    return Err(format!("record field '{}': invalid number", key));
                }
            }
            _ => {
                return Err(format!(
                    "record field '{}' must be a scalar (string, number, or boolean)",
                    key
                ))
            }
        };
        record.insert(key.clone(), value);
    }
    Ok(record)
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet, false, false);

    match cli.command {
        Commands::Check { expression } => match conditions::parse(&expression) {
            Ok(condition) => {
                let data = CheckData {
                    action: "check",
                    expression,
                    normalized: condition.to_string(),
                    clauses: condition.clause_count(),
                };
                match output_mode {
                    OutputMode::Json => output::print_json(&data),
                    OutputMode::Quiet => {}
                    _ => println!("{}", data.normalized),
                }
                Ok(())
            }
            Err(e) => fail(
                output_mode,
                exit_codes::PARSE_ERROR,
                &format!("invalid expression: {}", e),
                vec![],
            ),
        },

        Commands::Eval { rule, expr, data } => {
            let raw = match read_data_arg(&data) {
                Ok(raw) => raw,
                Err(e) => fail(
                    output_mode,
                    exit_codes::INVALID_ARGS,
                    &format!("{:#}", e),
                    vec![],
                ),
            };
            let record = match decode_record(&raw) {
                Ok(record) => record,
                Err(message) => fail(output_mode, exit_codes::INVALID_ARGS, &message, vec![]),
            };

            // (label, condition) pairs to evaluate
            let mut fuzzy_threshold = config::DEFAULT_FUZZY_THRESHOLD;
            let mut targets: Vec<(String, Condition)> = Vec::new();

            if let Some(expression) = expr {
                match conditions::parse(&expression) {
                    Ok(condition) => targets.push((expression, condition)),
                    Err(e) => fail(
                        output_mode,
                        exit_codes::PARSE_ERROR,
                        &format!("invalid expression: {}", e),
                        vec![],
                    ),
                }
            } else {
                let config = load_config_or_fail(output_mode, config_path);
                let store = build_store_or_fail(output_mode, &config);
                fuzzy_threshold = config.settings.fuzzy_threshold;

                if rule.is_empty() {
                    if store.is_empty() {
                        fail(
                            output_mode,
                            exit_codes::RULE_NOT_FOUND,
                            "no rules defined",
                            vec![],
                        );
                    }
                    for stored in store.iter() {
                        targets.push((stored.rule.name.clone(), stored.condition.clone()));
                    }
                } else {
                    for selector in &rule {
                        match store.find(selector) {
                            Some(stored) => {
                                targets.push((stored.rule.name.clone(), stored.condition.clone()))
                            }
                            None => {
                                let suggestions = store.suggest(selector, fuzzy_threshold);
                                fail(
                                    output_mode,
                                    exit_codes::RULE_NOT_FOUND,
                                    &format!("rule not found: '{}'", selector),
                                    suggestions,
                                );
                            }
                        }
                    }
                }
            }

            let mut results = Vec::with_capacity(targets.len());
            for (name, condition) in &targets {
                match conditions::evaluate(condition, &record) {
                    Ok(passed) => results.push(Verdict {
                        rule: name.clone(),
                        passed,
                    }),
                    Err(e) => {
                        let suggestions = match &e {
                            EvalError::FieldNotFound(field) => suggest_names(
                                field,
                                record.keys().map(|k| k.as_str()),
                                fuzzy_threshold,
                            ),
                            _ => vec![],
                        };
                        fail(
                            output_mode,
                            exit_codes::EVAL_ERROR,
                            &format!("cannot evaluate '{}': {}", name, e),
                            suggestions,
                        );
                    }
                }
            }

            let passed = results.iter().all(|v| v.passed);
            match output_mode {
                OutputMode::Json => output::print_json(&EvalData {
                    action: "eval",
                    passed,
                    results,
                }),
                OutputMode::Quiet => {}
                _ => {
                    for verdict in &results {
                        println!(
                            "{}: {}",
                            verdict.rule,
                            if verdict.passed { "pass" } else { "fail" }
                        );
                    }
                }
            }

            if passed {
                Ok(())
            } else {
                std::process::exit(exit_codes::RULE_FAILED);
            }
        }

        Commands::Rules { command } => match command {
            RulesCommands::List {
                json,
                names,
                format,
                detailed,
                skip,
                limit,
            } => {
                let config = load_config_or_fail(output_mode, config_path);
                let store = build_store_or_fail(output_mode, &config);

                let list_mode = OutputMode::from_flags(
                    json || cli.json,
                    cli.no_json,
                    cli.quiet,
                    names,
                    format.is_some(),
                );

                let page = store.page(skip, limit);
                match list_mode {
                    OutputMode::Names => {
                        for stored in &page {
                            println!("{}", stored.rule.name);
                        }
                    }
                    OutputMode::Format => {
                        let template = format.unwrap_or_default();
                        for stored in &page {
                            println!(
                                "{}",
                                output::format_template(&template, &RuleDetailed::from(&stored.rule))
                            );
                        }
                    }
                    OutputMode::Json => {
                        if detailed {
                            let response = ListResponse {
                                items: page
                                    .iter()
                                    .map(|stored| RuleDetailed::from(&stored.rule))
                                    .collect(),
                                total: store.len(),
                            };
                            output::print_json(&response);
                        } else {
                            let response = ListResponse {
                                items: page
                                    .iter()
                                    .map(|stored| RuleSummary {
                                        id: stored.rule.id,
                                        name: stored.rule.name.clone(),
                                    })
                                    .collect(),
                                total: store.len(),
                            };
                            output::print_json(&response);
                        }
                    }
                    OutputMode::Quiet => {}
                    OutputMode::Text => {
                        for stored in &page {
                            println!("{}  {}", stored.rule.id, stored.rule.name);
                            if detailed {
                                if !stored.rule.description.is_empty() {
                                    println!("   {}", stored.rule.description);
                                }
                                println!("   {}", stored.rule.rule_string);
                            }
                        }
                    }
                }
                Ok(())
            }

            RulesCommands::Show { rule } => {
                let config = load_config_or_fail(output_mode, config_path);
                let store = build_store_or_fail(output_mode, &config);

                match store.find(&rule) {
                    Some(stored) => {
                        let data = RuleDetailed::from(&stored.rule);
                        match output_mode {
                            OutputMode::Json => output::print_json(&data),
                            OutputMode::Quiet => {}
                            _ => {
                                println!("{}  {}", data.id, data.name);
                                if !data.description.is_empty() {
                                    println!("   {}", data.description);
                                }
                                println!("   {}", data.rule_string);
                            }
                        }
                        Ok(())
                    }
                    None => {
                        let suggestions = store.suggest(&rule, config.settings.fuzzy_threshold);
                        fail(
                            output_mode,
                            exit_codes::RULE_NOT_FOUND,
                            &format!("rule not found: '{}'", rule),
                            suggestions,
                        );
                    }
                }
            }

            RulesCommands::Add {
                name,
                description,
                expression,
            } => {
                let mut config = load_config_or_fail(output_mode, config_path);
                let mut store = build_store_or_fail(output_mode, &config);

                let created_at = Some(Utc::now());
                let added = match store.add(&name, &description, &expression, created_at) {
                    Ok(rule) => rule.clone(),
                    Err(e) => fail(output_mode, store_error_code(&e), &e.to_string(), vec![]),
                };

                config.rules.push(RuleDefinition {
                    name: added.name.clone(),
                    description: added.description.clone(),
                    rule: added.rule_string.clone(),
                    created_at,
                });
                save_config_or_fail(output_mode, &config, &config::resolve_path(config_path));

                match output_mode {
                    OutputMode::Json => output::print_json(&RuleChangeData {
                        action: "add",
                        rule: RuleDetailed::from(&added),
                    }),
                    OutputMode::Quiet => {}
                    _ => println!("added rule {} (id {})", added.name, added.id),
                }
                Ok(())
            }

            RulesCommands::Remove { rule } => {
                let mut config = load_config_or_fail(output_mode, config_path);
                let mut store = build_store_or_fail(output_mode, &config);

                let removed = match store.remove(&rule) {
                    Ok(removed) => removed,
                    Err(e) => {
                        let suggestions = match &e {
                            StoreError::NotFound(_) => {
                                store.suggest(&rule, config.settings.fuzzy_threshold)
                            }
                            _ => vec![],
                        };
                        fail(output_mode, store_error_code(&e), &e.to_string(), suggestions);
                    }
                };

                config.rules.retain(|d| d.name != removed.name);
                save_config_or_fail(output_mode, &config, &config::resolve_path(config_path));

                match output_mode {
                    OutputMode::Json => output::print_json(&RuleChangeData {
                        action: "remove",
                        rule: RuleDetailed::from(&removed),
                    }),
                    OutputMode::Quiet => {}
                    _ => println!("removed rule {}", removed.name),
                }
                Ok(())
            }

            RulesCommands::Combine {
                name,
                description,
                rules,
            } => {
                let mut config = load_config_or_fail(output_mode, config_path);
                let mut store = build_store_or_fail(output_mode, &config);

                // resolve selectors up front so a near-miss gets a suggestion
                for selector in &rules {
                    if store.find(selector).is_none() {
                        let suggestions =
                            store.suggest(selector, config.settings.fuzzy_threshold);
                        fail(
                            output_mode,
                            exit_codes::RULE_NOT_FOUND,
                            &format!("rule not found: '{}'", selector),
                            suggestions,
                        );
                    }
                }

                let created_at = Some(Utc::now());
                let combined = match store.combine(&rules, &name, &description, created_at) {
                    Ok(rule) => rule.clone(),
                    Err(e) => fail(output_mode, store_error_code(&e), &e.to_string(), vec![]),
                };

                config.rules.push(RuleDefinition {
                    name: combined.name.clone(),
                    description: combined.description.clone(),
                    rule: combined.rule_string.clone(),
                    created_at,
                });
                save_config_or_fail(output_mode, &config, &config::resolve_path(config_path));

                match output_mode {
                    OutputMode::Json => output::print_json(&CombineData {
                        action: "combine",
                        rule: RuleDetailed::from(&combined),
                        combined_from: rules,
                    }),
                    OutputMode::Quiet => {}
                    _ => println!(
                        "added rule {} (id {}): {}",
                        combined.name, combined.id, combined.rule_string
                    ),
                }
                Ok(())
            }
        },

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config_or_fail(output_mode, config_path);
                match output_mode {
                    OutputMode::Json => output::print_json(&config),
                    OutputMode::Quiet => {}
                    _ => println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    ),
                }
                Ok(())
            }

            ConfigCommands::Path => {
                let path = config::resolve_path(config_path);
                match output_mode {
                    OutputMode::Json => output::print_json(&PathData {
                        path: path.display().to_string(),
                    }),
                    OutputMode::Quiet => {}
                    _ => println!("{}", path.display()),
                }
                Ok(())
            }

            ConfigCommands::Verify => {
                let path = config::resolve_path(config_path);
                let errors = match config::verify(&path) {
                    Ok(errors) => errors,
                    Err(e) => fail(
                        output_mode,
                        exit_codes::CONFIG_ERROR,
                        &format!("{:#}", e),
                        vec![],
                    ),
                };

                let valid = errors.is_empty();
                match output_mode {
                    OutputMode::Json => output::print_json(&VerifyData {
                        valid,
                        errors: errors.clone(),
                    }),
                    OutputMode::Quiet => {}
                    _ => {
                        if valid {
                            println!("config OK: {}", path.display());
                        } else {
                            for error in &errors {
                                eprintln!("{}", error);
                            }
                        }
                    }
                }

                if valid {
                    Ok(())
                } else {
                    std::process::exit(exit_codes::CONFIG_ERROR);
                }
            }

            ConfigCommands::Default => {
                let config = Config::default();
                match output_mode {
                    OutputMode::Json => output::print_json(&config),
                    OutputMode::Quiet => {}
                    _ => println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    ),
                }
                Ok(())
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rulekit", &mut std::io::stdout());
            Ok(())
        }

        Commands::Version => {
            let version = Version::current();
            match output_mode {
                OutputMode::Json => output::print_json(&VersionData {
                    version: version.version_string(),
                    commit: version.short_commit.clone(),
                    channel: version.channel.clone(),
                    build_date: version.build_date.to_rfc3339(),
                }),
                OutputMode::Quiet => {}
                _ => println!("rulekit {}", version.version_string()),
            }
            Ok(())
        }
    }
}
