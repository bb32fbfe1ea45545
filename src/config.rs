use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::context::{DEFAULT_CAPACITY, DEFAULT_PERSISTED_HISTORY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub context_path: PathBuf,
    /// In-memory turn limit.
    pub history_capacity: usize,
    /// Turns written to the snapshot file.
    pub persisted_history: usize,
    /// Local scores at or above this skip the remote classifier.
    pub fast_path_threshold: f32,
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_path: PathBuf::from("nexus_context.json"),
            history_capacity: DEFAULT_CAPACITY,
            persisted_history: DEFAULT_PERSISTED_HISTORY,
            fast_path_threshold: 0.8,
            remote: RemoteConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-haiku-20240307".into(),
            max_tokens: 512,
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Defaults overridden by `NEXUS_CONTEXT_PATH`, `NEXUS_HISTORY_CAPACITY`,
    /// `LLM_API_URL`, `LLM_MODEL` and `LLM_TIMEOUT_SECS`.
    ///
    /// The API key is not configuration; it comes from a credential provider.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(path) = lookup("NEXUS_CONTEXT_PATH") {
            config.context_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("NEXUS_HISTORY_CAPACITY") {
            config.history_capacity = parse_number("NEXUS_HISTORY_CAPACITY", &value)?;
        }
        if let Some(url) = lookup("LLM_API_URL") {
            config.remote.api_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            config.remote.model = model;
        }
        if let Some(value) = lookup("LLM_TIMEOUT_SECS") {
            config.remote.timeout_secs = parse_number("LLM_TIMEOUT_SECS", &value)?;
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value: value.to_string() })
}
