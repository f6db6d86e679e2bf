// integration tests for the config command

use std::fs;

use crate::common::*;

/// helper to run editcond config command (text output)
fn run_config(args: &[&str], config_path: &std::path::Path) -> std::process::Output {
    // use --no-json to get text output (stdout is piped in tests, which auto-enables JSON)
    let mut cmd_args = vec!["--no-json", "config"];
    cmd_args.extend(args);
    run_editcond(config_path, &cmd_args)
}

// ============================================================================
// config show / path tests
// ============================================================================

#[test]
fn test_config_show_creates_default() {
    let test_dir = create_test_dir("config_show_default");
    let config_path = test_dir.join("nested").join("config.json");

    let output = run_config(&["show"], &config_path);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let shown: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(shown["settings"]["log_level"], "warn");
    assert_eq!(shown["settings"]["epsilon"], 1e-8);
    assert!(config_path.exists(), "default config should be written");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_show_json_output() {
    let test_dir = create_test_dir("config_show_json");
    let config_path = create_test_config(&test_dir, &[("editable", "bEnabled")]);

    let output = run_editcond(&config_path, &["--json", "config", "show"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json = json_of(&output);
    assert_eq!(json["result"]["conditions"]["editable"], "bEnabled");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_path_respects_override() {
    let test_dir = create_test_dir("config_path");
    let config_path = test_dir.join("custom.json");

    let output = run_config(&["path"], &config_path);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), config_path.to_str().unwrap());

    cleanup_test_dir(&test_dir);
}

// ============================================================================
// config set / reset tests
// ============================================================================

#[test]
fn test_config_set_condition_persists() {
    let test_dir = create_test_dir("config_set_condition");
    let config_path = create_test_config(&test_dir, &[]);

    let output = run_config(&["set", "conditions.visible", "Mode != EMode::Off"], &config_path);
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(stdout_of(&output).contains("Set conditions.visible = Mode != EMode::Off"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(saved["conditions"]["visible"], "Mode != EMode::Off");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_set_rejects_unparsable_condition() {
    let test_dir = create_test_dir("config_set_invalid");
    let config_path = create_test_config(&test_dir, &[]);
    let before = fs::read_to_string(&config_path).unwrap();

    let output = run_config(&["set", "conditions.broken", "A && (B"], &config_path);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("Invalid condition 'broken'"));
    assert_eq!(fs::read_to_string(&config_path).unwrap(), before);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_set_unknown_key() {
    let test_dir = create_test_dir("config_set_unknown");
    let config_path = create_test_config(&test_dir, &[]);

    let output = run_config(&["set", "settings.colour", "blue"], &config_path);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("Unknown config key"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_reset() {
    let test_dir = create_test_dir("config_reset");
    let config_path = create_test_config(&test_dir, &[("editable", "bEnabled")]);

    let output = run_config(&["reset"], &config_path);
    assert!(output.status.success());

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert!(saved["conditions"].as_object().unwrap().is_empty());

    cleanup_test_dir(&test_dir);
}

// ============================================================================
// config verify tests
// ============================================================================

#[test]
fn test_config_verify_valid() {
    let test_dir = create_test_dir("config_verify_valid");
    let config_path = create_test_config(
        &test_dir,
        &[("editable", "bEnabled && !bLocked"), ("flagged", "Flags & EFlags::Urgent")],
    );

    let output = run_config(&["verify"], &config_path);
    assert!(output.status.success(), "{}", stdout_of(&output));
    assert!(stdout_of(&output).contains("Configuration is valid"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_lists_errors() {
    let test_dir = create_test_dir("config_verify_errors");
    let config_path = create_test_config(&test_dir, &[("dangling", "A =="), ("ok", "A")]);

    let output = run_config(&["verify"], &config_path);
    assert_eq!(output.status.code(), Some(3));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("1 error(s)"), "{}", stdout);
    assert!(stdout.contains("conditions.dangling"), "{}", stdout);

    let output = run_editcond(&config_path, &["--json", "config", "verify"]);
    assert_eq!(output.status.code(), Some(3));
    let json = json_of(&output);
    assert_eq!(json["error"]["code"], -32003);
    assert!(json["error"]["data"]["details"]
        .as_str()
        .unwrap()
        .contains("conditions.dangling"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_missing_file() {
    let test_dir = create_test_dir("config_verify_missing");
    let config_path = test_dir.join("missing.json");

    let output = run_config(&["verify"], &config_path);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("config file not found"));
    assert!(!config_path.exists());

    cleanup_test_dir(&test_dir);
}
