mod schema;

pub use schema::{Config, Settings, DEFAULT_LOG_LEVEL, LOG_LEVELS};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::conditions;

const CONFIG_ENV_VAR: &str = "EDITCOND_CONFIG";

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    // ~/.editcond/config.json
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".editcond")
        .join("config.json"))
}

/// `--config` wins over the environment and the default location
pub fn get_config_path_with_override(config_override: Option<&Path>) -> Result<PathBuf> {
    match config_override {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_path(),
    }
}

pub fn load() -> Result<Config> {
    load_with_override(None)
}

pub fn load_with_override(config_override: Option<&Path>) -> Result<Config> {
    let path = get_config_path_with_override(config_override)?;

    if !path.exists() {
        let config = Config::default();
        save_with_override(&config, config_override)?;
        tracing::debug!("created default config at {}", path.display());
        return Ok(config);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

pub fn save_with_override(config: &Config, config_override: Option<&Path>) -> Result<()> {
    let path = get_config_path_with_override(config_override)?;

    // ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Verify configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    let mut errors = Vec::new();

    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    if let Err(e) = validate_epsilon(config.settings.epsilon) {
        errors.push(format!("settings.epsilon: {}", e));
    }

    if let Err(e) = validate_log_level(&config.settings.log_level) {
        errors.push(format!("settings.log_level: {}", e));
    }

    for (name, source) in &config.conditions {
        if let Err(e) = conditions::parse(source) {
            errors.push(format!("conditions.{}: {}", name, e));
        }
    }

    Ok(errors)
}

fn validate_epsilon(epsilon: f64) -> Result<(), String> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(format!(
            "invalid epsilon {}: must be a finite number >= 0",
            epsilon
        ));
    }
    Ok(())
}

fn validate_log_level(level: &str) -> Result<(), String> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Ok(());
    }
    Err(format!(
        "invalid log level '{}': valid levels are {}",
        level,
        LOG_LEVELS.join(", ")
    ))
}

pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.splitn(2, '.').collect();

    match parts.as_slice() {
        ["settings", "epsilon"] => {
            let epsilon: f64 = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
            validate_epsilon(epsilon).map_err(|e| anyhow!(e))?;
            config.settings.epsilon = epsilon;
        }
        ["settings", "log_level"] => {
            validate_log_level(value).map_err(|e| anyhow!(e))?;
            config.settings.log_level = value.to_lowercase();
        }
        ["conditions", name] if !name.is_empty() => {
            if value.trim().is_empty() {
                config.conditions.remove(*name);
                return Ok(());
            }
            conditions::parse(value)
                .with_context(|| format!("Invalid condition '{}'", name))?;
            config.conditions.insert(name.to_string(), value.to_string());
        }
        _ => {
            return Err(anyhow!(
                "Unknown config key: {}. Valid keys are settings.epsilon, settings.log_level and conditions.<name>",
                key
            ));
        }
    }

    Ok(())
}
