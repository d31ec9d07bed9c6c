// integration tests for config commands

use std::fs;

use crate::common::{
    cleanup_test_dir, create_test_dir, json_result, run_rulekit, write_default_rules_file,
};

#[test]
fn test_config_path_honors_env_var() {
    let test_dir = create_test_dir("config_path_env");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--no-json", "config", "path"], &config_path);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        config_path.display().to_string()
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_flag_overrides_env_var() {
    let test_dir = create_test_dir("config_path_flag");
    let env_config = write_default_rules_file(&test_dir);
    let flag_config = test_dir.join("other.json");
    fs::write(&flag_config, r#"{ "rules": [] }"#).unwrap();

    let flag_arg = flag_config.display().to_string();
    let output = run_rulekit(
        &["--no-json", "--config", &flag_arg, "config", "path"],
        &env_config,
    );
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        flag_config.display().to_string()
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_show_creates_default_on_first_run() {
    let test_dir = create_test_dir("config_show_default");
    let config_path = test_dir.join("rules.json");
    assert!(!config_path.exists());

    let output = run_rulekit(&["--json", "config", "show"], &config_path);
    assert!(output.status.success());

    // default config was written and contains the example rules
    assert!(config_path.exists());
    let result = json_result(&output);
    let rules = result["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["name"], "Age Rule");
    assert_eq!(rules[1]["rule"], "income > 50000");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_valid() {
    let test_dir = create_test_dir("config_verify_valid");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--no-json", "config", "verify"], &config_path);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("config OK"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_reports_broken_rules() {
    let test_dir = create_test_dir("config_verify_broken");
    let config_path = test_dir.join("rules.json");
    fs::write(
        &config_path,
        r#"{
            "rules": [
                { "name": "Good", "rule": "age > 18" },
                { "name": "Bad", "rule": "age 18" }
            ]
        }"#,
    )
    .unwrap();

    let output = run_rulekit(&["--json", "config", "verify"], &config_path);
    assert_eq!(output.status.code(), Some(7));

    let result = json_result(&output);
    assert_eq!(result["valid"], false);
    let errors = result["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("missing operator"));

    // text mode prints the errors to stderr
    let output = run_rulekit(&["--no-json", "config", "verify"], &config_path);
    assert_eq!(output.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing operator"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_missing_file() {
    let test_dir = create_test_dir("config_verify_missing");
    let config_path = test_dir.join("nope.json");

    let output = run_rulekit(&["--json", "config", "verify"], &config_path);
    assert_eq!(output.status.code(), Some(7));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_default_shows_example_rules() {
    let test_dir = create_test_dir("config_default");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--no-json", "config", "default"], &config_path);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Age Rule"));
    assert!(stdout.contains("age > 18"));
    assert!(stdout.contains("fuzzy_threshold"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_broken_config_json_reported() {
    let test_dir = create_test_dir("config_broken_json");
    let config_path = test_dir.join("rules.json");
    fs::write(&config_path, "{ not json").unwrap();

    let output = run_rulekit(&["--json", "rules", "list"], &config_path);
    assert_eq!(output.status.code(), Some(7));

    cleanup_test_dir(&test_dir);
}
