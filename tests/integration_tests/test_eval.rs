// integration tests for the eval command

use std::fs;

use crate::common::{
    cleanup_test_dir, create_test_dir, json_error, json_result, run_rulekit,
    run_rulekit_with_stdin, write_default_rules_file,
};

#[test]
fn test_eval_all_rules_pass() {
    let test_dir = create_test_dir("eval_all_pass");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "--data", r#"{"age": 30, "income": 60000}"#],
        &config_path,
    );
    assert!(output.status.success());

    let result = json_result(&output);
    assert_eq!(result["action"], "eval");
    assert_eq!(result["passed"], true);
    assert_eq!(result["results"].as_array().unwrap().len(), 2);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_failing_rule_sets_exit_code() {
    let test_dir = create_test_dir("eval_fail");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "--data", r#"{"age": 10, "income": 60000}"#],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(5));

    let result = json_result(&output);
    assert_eq!(result["passed"], false);
    let results = result["results"].as_array().unwrap();
    assert_eq!(results[0]["rule"], "Age Rule");
    assert_eq!(results[0]["passed"], false);
    assert_eq!(results[1]["rule"], "Income Rule");
    assert_eq!(results[1]["passed"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_single_rule_by_name_and_id() {
    let test_dir = create_test_dir("eval_single");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "Age Rule", "--data", r#"{"age": 30}"#],
        &config_path,
    );
    assert!(output.status.success());
    let result = json_result(&output);
    assert_eq!(result["results"].as_array().unwrap().len(), 1);

    // same rule addressed by id
    let output = run_rulekit(
        &["--json", "eval", "1", "--data", r#"{"age": 30}"#],
        &config_path,
    );
    assert!(output.status.success());
    assert_eq!(json_result(&output)["results"][0]["rule"], "Age Rule");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_unknown_rule_suggests() {
    let test_dir = create_test_dir("eval_unknown_rule");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "Age Rul", "--data", r#"{"age": 30}"#],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(2));

    let error = json_error(&output);
    assert_eq!(error["code"], -32002);
    assert_eq!(error["data"]["suggestions"][0], "Age Rule");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_adhoc_expression() {
    let test_dir = create_test_dir("eval_expr");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &[
            "--json",
            "eval",
            "--expr",
            "age > 18 AND income > 50000",
            "--data",
            r#"{"age": 30, "income": 60000}"#,
        ],
        &config_path,
    );
    assert!(output.status.success());
    assert_eq!(json_result(&output)["passed"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_field_not_found() {
    let test_dir = create_test_dir("eval_missing_field");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "Age Rule", "--data", r#"{"income": 10}"#],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(4));
    assert!(json_error(&output)["message"]
        .as_str()
        .unwrap()
        .contains("field not found"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_field_not_found_suggests_close_key() {
    let test_dir = create_test_dir("eval_field_suggest");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "Age Rule", "--data", r#"{"agee": 30}"#],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(json_error(&output)["data"]["suggestions"][0], "agee");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_type_mismatch() {
    let test_dir = create_test_dir("eval_type_mismatch");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &["--json", "eval", "Age Rule", "--data", r#"{"age": "old"}"#],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(4));
    assert!(json_error(&output)["message"]
        .as_str()
        .unwrap()
        .contains("type mismatch"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_rejects_bad_record() {
    let test_dir = create_test_dir("eval_bad_record");
    let config_path = write_default_rules_file(&test_dir);

    // not JSON at all
    let output = run_rulekit(&["--json", "eval", "--data", "not json"], &config_path);
    assert_eq!(output.status.code(), Some(6));

    // not an object
    let output = run_rulekit(&["--json", "eval", "--data", "[1, 2]"], &config_path);
    assert_eq!(output.status.code(), Some(6));

    // nested values are not scalars
    let output = run_rulekit(
        &["--json", "eval", "--data", r#"{"tags": ["a"]}"#],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(6));
    assert!(json_error(&output)["message"]
        .as_str()
        .unwrap()
        .contains("scalar"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_record_from_file() {
    let test_dir = create_test_dir("eval_record_file");
    let config_path = write_default_rules_file(&test_dir);

    let record_path = test_dir.join("record.json");
    fs::write(&record_path, r#"{"age": 30, "income": 60000}"#).unwrap();

    let data_arg = format!("@{}", record_path.display());
    let output = run_rulekit(&["--json", "eval", "--data", &data_arg], &config_path);
    assert!(output.status.success());
    assert_eq!(json_result(&output)["passed"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_record_from_stdin() {
    let test_dir = create_test_dir("eval_record_stdin");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit_with_stdin(
        &["--json", "eval", "--data", "-"],
        &config_path,
        r#"{"age": 30, "income": 60000}"#,
    );
    assert!(output.status.success());
    assert_eq!(json_result(&output)["passed"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_text_output() {
    let test_dir = create_test_dir("eval_text");
    let config_path = write_default_rules_file(&test_dir);

    let output = run_rulekit(
        &[
            "--no-json",
            "eval",
            "--data",
            r#"{"age": 30, "income": 40000}"#,
        ],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(5));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Age Rule: pass"));
    assert!(stdout.contains("Income Rule: fail"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_no_rules_defined() {
    let test_dir = create_test_dir("eval_no_rules");
    let config_path = test_dir.join("rules.json");
    fs::write(&config_path, r#"{ "rules": [] }"#).unwrap();

    let output = run_rulekit(&["--json", "eval", "--data", r#"{"age": 1}"#], &config_path);
    assert_eq!(output.status.code(), Some(2));

    cleanup_test_dir(&test_dir);
}
