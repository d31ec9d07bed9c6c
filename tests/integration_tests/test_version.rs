// integration tests for version output

use crate::common::{cleanup_test_dir, create_test_dir, json_result, run_rulekit, write_default_rules_file};

#[test]
fn test_version_command() {
    let test_dir = create_test_dir("version_command");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--no-json", "version"], &config_path);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("rulekit "));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_version_json_fields() {
    let test_dir = create_test_dir("version_json");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--json", "version"], &config_path);
    assert!(output.status.success());

    let result = json_result(&output);
    assert!(result["version"].as_str().unwrap().contains('('));
    assert!(!result["commit"].as_str().unwrap().is_empty());
    assert!(!result["channel"].as_str().unwrap().is_empty());
    assert!(!result["build_date"].as_str().unwrap().is_empty());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_version_flag() {
    let test_dir = create_test_dir("version_flag");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--version"], &config_path);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("rulekit"));

    cleanup_test_dir(&test_dir);
}
