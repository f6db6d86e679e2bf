use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conditions::DEFAULT_EPSILON;

pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// named edit conditions, name -> source
    #[serde(default)]
    pub conditions: BTreeMap<String, String>,
}

impl Config {
    pub fn condition(&self, name: &str) -> Option<&str> {
        self.conditions.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// tolerance for numeric equality and multi-instance agreement
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
