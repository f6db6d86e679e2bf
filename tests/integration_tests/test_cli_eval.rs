// integration tests for the eval command

use crate::common::*;

#[test]
fn test_eval_expression_text_output() {
    let test_dir = create_test_dir("eval_text");
    let config_path = create_test_config(&test_dir, &[]);
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);
    let subject = subject.to_str().unwrap();

    let output = run_editcond(
        &config_path,
        &["--no-json", "eval", "bEnabled && Mode == EMode::On", "--subject", subject],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert_eq!(stdout_of(&output).trim(), "true");

    let output = run_editcond(
        &config_path,
        &["--no-json", "eval", "Count > 10", "--subject", subject],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert_eq!(stdout_of(&output).trim(), "false");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_json_output() {
    let test_dir = create_test_dir("eval_json");
    let config_path = create_test_config(&test_dir, &[]);
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);

    let output = run_editcond(
        &config_path,
        &[
            "--json",
            "eval",
            "Flags & EFlags::Locked",
            "--subject",
            subject.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json = json_of(&output);
    assert_eq!(json["result"]["result"], true);
    assert_eq!(json["result"]["subject"], "MyActor");
    assert_eq!(json["result"]["instances"], 1);
    assert!(json["result"].get("condition").is_none());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_named_condition() {
    let test_dir = create_test_dir("eval_named");
    let config_path = create_test_config(
        &test_dir,
        &[("editable", "bEnabled && !bLocked"), ("busy", "Count > 5")],
    );
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);

    let output = run_editcond(
        &config_path,
        &[
            "--json",
            "eval",
            "--condition",
            "editable",
            "--subject",
            subject.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json = json_of(&output);
    assert_eq!(json["result"]["condition"], "editable");
    assert_eq!(json["result"]["source"], "bEnabled && !bLocked");
    assert_eq!(json["result"]["result"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_unknown_condition_suggests_names() {
    let test_dir = create_test_dir("eval_unknown_condition");
    let config_path = create_test_config(&test_dir, &[("editable", "bEnabled")]);
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);

    let output = run_editcond(
        &config_path,
        &[
            "--json",
            "eval",
            "--condition",
            "editabel",
            "--subject",
            subject.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(2));

    let json = json_of(&output);
    assert_eq!(json["error"]["code"], -32002);
    assert_eq!(json["error"]["data"]["suggestions"][0], "editable");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_unknown_field_suggests_fields() {
    let test_dir = create_test_dir("eval_unknown_field");
    let config_path = create_test_config(&test_dir, &[]);
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);

    let output = run_editcond(
        &config_path,
        &[
            "--no-json",
            "eval",
            "bEnabeld",
            "--subject",
            subject.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(5));

    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("attempted to use an invalid operand \"bEnabeld\""),
        "{}",
        stderr
    );
    assert!(stderr.contains("Did you mean: bEnabled?"), "{}", stderr);
    assert_eq!(
        stderr.matches("invalid operand").count(),
        1,
        "failure should be printed once: {}",
        stderr
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_parse_error_exit_code() {
    let test_dir = create_test_dir("eval_parse_error");
    let config_path = create_test_config(&test_dir, &[]);
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);

    let output = run_editcond(
        &config_path,
        &["--json", "eval", "bEnabled &&", "--subject", subject.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(json_of(&output)["error"]["code"], -32004);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_missing_subject_exit_code() {
    let test_dir = create_test_dir("eval_missing_subject");
    let config_path = create_test_config(&test_dir, &[]);
    let missing = test_dir.join("missing.json");

    let output = run_editcond(
        &config_path,
        &["--json", "eval", "bEnabled", "--subject", missing.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(6));
    assert!(json_of(&output)["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Failed to read subject file"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_requires_expression_or_condition() {
    let test_dir = create_test_dir("eval_args");
    let config_path = create_test_config(&test_dir, &[]);

    let output = run_editcond(&config_path, &["eval", "--subject", "actor.json"]);
    assert_eq!(output.status.code(), Some(2));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_uses_configured_epsilon() {
    let test_dir = create_test_dir("eval_epsilon");
    let config_path = create_test_config(&test_dir, &[]);
    let subject = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);
    let subject = subject.to_str().unwrap();

    let output = run_editcond(
        &config_path,
        &["--no-json", "eval", "Speed == 1.5001", "--subject", subject],
    );
    assert_eq!(stdout_of(&output).trim(), "false");

    let output = run_editcond(
        &config_path,
        &["config", "set", "settings.epsilon", "0.001"],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    let output = run_editcond(
        &config_path,
        &["--no-json", "eval", "Speed == 1.5001", "--subject", subject],
    );
    assert_eq!(stdout_of(&output).trim(), "true");

    cleanup_test_dir(&test_dir);
}
