// integration tests for the check command

use crate::common::{
    cleanup_test_dir, create_test_dir, json_error, json_result, run_rulekit,
    write_default_rules_file,
};

#[test]
fn test_check_valid_expression() {
    let test_dir = create_test_dir("check_valid");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--json", "check", "age > 18"], &config_path);
    assert!(output.status.success());

    let result = json_result(&output);
    assert_eq!(result["action"], "check");
    assert_eq!(result["normalized"], "age > 18");
    assert_eq!(result["clauses"], 1);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_normalizes_whitespace() {
    let test_dir = create_test_dir("check_normalize");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--no-json", "check", "age>18"], &config_path);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "age > 18");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_compound_expression() {
    let test_dir = create_test_dir("check_compound");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &[
            "--json",
            "check",
            "(age>18 AND income>50000) OR country=='US'",
        ],
        &config_path,
    );
    assert!(output.status.success());

    let result = json_result(&output);
    assert_eq!(
        result["normalized"],
        "(age > 18 AND income > 50000) OR country == 'US'"
    );
    assert_eq!(result["clauses"], 3);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_missing_operator() {
    let test_dir = create_test_dir("check_missing_op");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--json", "check", "age 18"], &config_path);
    assert_eq!(output.status.code(), Some(3));

    let error = json_error(&output);
    assert_eq!(error["code"], -32003);
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("missing operator"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_empty_expression() {
    let test_dir = create_test_dir("check_empty");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--json", "check", ""], &config_path);
    assert_eq!(output.status.code(), Some(3));
    assert!(json_error(&output)["message"]
        .as_str()
        .unwrap()
        .contains("missing operator"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_text_error_goes_to_stderr() {
    let test_dir = create_test_dir("check_text_error");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(&["--no-json", "check", "> 18"], &config_path);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty field name"));

    cleanup_test_dir(&test_dir);
}
