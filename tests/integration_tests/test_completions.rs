// integration tests for shell completion scripts

use crate::common::*;

#[test]
fn test_completions_for_each_shell() {
    let test_dir = create_test_dir("completions");
    let config_path = test_dir.join("config.json");

    for shell in ["bash", "zsh", "fish"] {
        let output = run_editcond(&config_path, &["--no-json", "completions", shell]);
        assert!(output.status.success(), "{}: {}", shell, stderr_of(&output));

        let script = stdout_of(&output);
        assert!(script.contains("editcond"), "{} script should name the binary", shell);
        assert!(script.contains("check"), "{} script should list subcommands", shell);
    }

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_completions_rejects_unknown_shell() {
    let test_dir = create_test_dir("completions_unknown");
    let config_path = test_dir.join("config.json");

    let output = run_editcond(&config_path, &["completions", "powershell"]);
    assert_eq!(output.status.code(), Some(2));

    cleanup_test_dir(&test_dir);
}
