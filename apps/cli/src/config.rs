//! Environment configuration.

use std::path::PathBuf;

use srs_core::SchedulerSettings;
use thiserror::Error;

/// Snapshot path variable.
pub const STORE_VAR: &str = "RECALL_STORE";
/// Minimum-one-day policy variable.
pub const MIN_ONE_DAY_VAR: &str = "RECALL_MIN_ONE_DAY";
/// Fallback similarity variable.
pub const FALLBACK_VAR: &str = "RECALL_FALLBACK_SIMILARITY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub settings: SchedulerSettings,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_path = lookup(STORE_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_store_path);

        let mut settings = SchedulerSettings::default();
        if let Some(value) = lookup(MIN_ONE_DAY_VAR) {
            settings.minimum_one_day = parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: MIN_ONE_DAY_VAR,
                value,
            })?;
        }
        if let Some(value) = lookup(FALLBACK_VAR) {
            settings.fallback_similarity = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|score| (0.0..=1.0).contains(score))
                .ok_or(ConfigError::InvalidValue {
                    key: FALLBACK_VAR,
                    value,
                })?;
        }

        Ok(Self {
            store_path,
            settings,
        })
    }
}

/// `<local data dir>/recall/collection.json`, or the current directory when
/// the platform has no data directory.
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recall")
        .join("collection.json")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
