// integration tests for the check command

use crate::common::*;

#[test]
fn test_check_prints_postfix() {
    let test_dir = create_test_dir("check_text");
    let config_path = test_dir.join("config.json");

    let output = run_editcond(
        &config_path,
        &["--no-json", "check", "bEnabled && (Count + 1) * 2 > 4"],
    );

    assert!(
        output.status.success(),
        "check should succeed: {}",
        stderr_of(&output)
    );
    let stdout = stdout_of(&output);
    assert!(
        stdout.starts_with("bEnabled Count 1 + 2 * 4 > &&"),
        "unexpected postfix: {}",
        stdout
    );
    assert!(stdout.contains("properties: bEnabled, Count"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_json_output() {
    let test_dir = create_test_dir("check_json");
    let config_path = test_dir.join("config.json");

    let output = run_editcond(&config_path, &["--json", "check", "!bA || Mode == EMode::On"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json = json_of(&output);
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["result"]["source"], "!bA || Mode == EMode::On");

    let postfix = json["result"]["postfix"].as_array().unwrap();
    let texts: Vec<&str> = postfix.iter().map(|t| t["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["bA", "!", "Mode", "EMode::On", "==", "||"]);
    assert_eq!(postfix[1]["type"], "unary");
    assert_eq!(postfix[3]["type"], "enum");
    assert_eq!(postfix[3]["position"], 15);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_tokens() {
    let test_dir = create_test_dir("check_tokens");
    let config_path = test_dir.join("config.json");

    let output = run_editcond(&config_path, &["--json", "check", "--tokens", "X > -2"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json = json_of(&output);
    let tokens = json["result"]["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1]["type"], "operator");
    assert_eq!(tokens[2]["type"], "number");
    assert_eq!(tokens[2]["text"], "-2");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_parse_error_exit_code() {
    let test_dir = create_test_dir("check_error");
    let config_path = test_dir.join("config.json");

    let output = run_editcond(&config_path, &["--no-json", "check", "A && (B"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr_of(&output).contains("unmatched '('"));

    let output = run_editcond(&config_path, &["--json", "check", "EFoo::"]);
    assert_eq!(output.status.code(), Some(4));
    let json = json_of(&output);
    assert_eq!(json["error"]["code"], -32004);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("double colon at end"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_does_not_create_config() {
    let test_dir = create_test_dir("check_no_config");
    let config_path = test_dir.join("config.json");

    let output = run_editcond(&config_path, &["--quiet", "check", "A"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).is_empty());
    assert!(!config_path.exists());

    cleanup_test_dir(&test_dir);
}
