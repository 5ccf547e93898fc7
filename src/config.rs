use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::runtime::{DEFAULT_MAX_STEPS, Limits};

pub const ENV_MAX_STEPS: &str = "NANO_MAX_STEPS";
pub const ENV_TIMEOUT_MS: &str = "NANO_TIMEOUT_MS";
pub const ENV_NO_OUTPUT: &str = "NANO_NO_OUTPUT";

pub const DEFAULT_NO_OUTPUT: &str = "(no output)";

/// Runner settings. Sources are layered: defaults, then a JSON file, then
/// the environment, then command line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `None` runs without a step budget.
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
    /// Shown by the CLI when a run captures nothing.
    pub no_output_placeholder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_steps: Some(DEFAULT_MAX_STEPS),
            timeout_ms: None,
            no_output_placeholder: DEFAULT_NO_OUTPUT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are logged
    /// and leave the current setting in place.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_MAX_STEPS) {
            if let Some(value) = parse_limit(ENV_MAX_STEPS, &raw) {
                self.max_steps = value;
            }
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            if let Some(value) = parse_limit(ENV_TIMEOUT_MS, &raw) {
                self.timeout_ms = value;
            }
        }
        if let Some(placeholder) = lookup(ENV_NO_OUTPUT) {
            self.no_output_placeholder = placeholder;
        }
        self
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_steps: self.max_steps,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// `0` and `none` disable a limit. Returns `None` when the value is invalid.
fn parse_limit(key: &str, raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    match raw.parse::<u64>() {
        Ok(0) => Some(None),
        Ok(value) => Some(Some(value)),
        Err(err) => {
            log::warn!("ignoring {}={:?}: {}", key, raw, err);
            None
        }
    }
}
