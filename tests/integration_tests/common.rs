// shared utilities for integration tests

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

// counter for unique test directory names
static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// subject used by most eval tests
pub const ACTOR_SUBJECT: &str = r#"{
    "name": "MyActor",
    "enums": {
        "EMode": { "Off": 0, "On": 1, "Auto": 2 },
        "EFlags": { "None": 0, "Urgent": 1, "Hidden": 2, "Locked": 4 }
    },
    "fields": {
        "bEnabled": "bool",
        "bLocked": "bool",
        "Count": "int32",
        "Speed": "float",
        "Mode": "EMode",
        "Flags": "EFlags",
        "Target": "AActor*"
    },
    "instances": [
        {
            "bEnabled": true,
            "bLocked": false,
            "Count": 3,
            "Speed": 1.5,
            "Mode": "On",
            "Flags": 5,
            "Target": null
        }
    ]
}"#;

/// create a fresh temporary directory for one test
pub fn create_test_dir(prefix: &str) -> PathBuf {
    let count = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let name = format!("{}_{}_{}", prefix, std::process::id(), count);
    let dir = env::temp_dir().join("editcond_integration_tests").join(name);

    // clean up if exists
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }

    fs::create_dir_all(&dir).expect("Failed to create test directory");
    dir
}

/// clean up a test directory
pub fn cleanup_test_dir(path: &Path) {
    if path.exists() {
        fs::remove_dir_all(path).ok();
    }
}

/// write a file into the test directory and return its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// write a config file with the given named conditions
#[allow(dead_code)]
pub fn create_test_config(dir: &Path, conditions: &[(&str, &str)]) -> PathBuf {
    let conditions: serde_json::Map<String, serde_json::Value> = conditions
        .iter()
        .map(|(name, source)| (name.to_string(), serde_json::json!(source)))
        .collect();

    let config = serde_json::json!({
        "settings": { "epsilon": 1e-8, "log_level": "error" },
        "conditions": conditions,
    });

    write_file(
        dir,
        "config.json",
        &serde_json::to_string_pretty(&config).unwrap(),
    )
}

pub fn editcond_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_editcond"))
}

/// run editcond with `--config` pointing into `dir`
///
/// stdout is piped, so pass `--json` or `--no-json` explicitly when the
/// output format matters.
pub fn run_editcond(config_path: &Path, args: &[&str]) -> Output {
    Command::new(editcond_binary_path())
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("EDITCOND_CONFIG")
        .output()
        .expect("Failed to run editcond")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// parse the single JSON-RPC line printed on stdout
pub fn json_of(output: &Output) -> serde_json::Value {
    let stdout = stdout_of(output);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): stdout={} stderr={}",
            e,
            stdout,
            stderr_of(output)
        )
    })
}
