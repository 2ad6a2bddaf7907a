//! Run configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. The index and its market suffix are fixed, and the
//! access token only comes from the environment; neither is a config key.

use chrono::NaiveDate;
use ibovlab_core::composition::CompositionSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one batch run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// First day of price history (inclusive).
    pub start: NaiveDate,

    /// Moving-average windows, in trading days.
    pub windows: Vec<usize>,

    /// Directory that receives the chart images.
    pub output_dir: PathBuf,

    /// Currency shown on the price axis.
    pub currency: String,

    /// Per-request HTTP timeout in seconds.
    pub http_timeout_secs: u64,

    /// Retries for transient price-provider failures.
    pub max_retries: u32,

    /// Chart rendering threads; 1 renders sequentially.
    pub jobs: usize,

    /// Drop repeated composition members.
    pub dedupe: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            windows: vec![20, 50],
            output_dir: PathBuf::from("."),
            currency: "BRL".into(),
            http_timeout_secs: 30,
            max_retries: 3,
            jobs: 1,
            dedupe: true,
        }
    }
}

impl RunConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.windows.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one moving-average window is required".into(),
            ));
        }
        if let Some(w) = self.windows.iter().find(|&&w| w == 0) {
            return Err(ConfigError::Invalid(format!(
                "moving-average window {w} must be positive"
            )));
        }
        if self.jobs == 0 {
            return Err(ConfigError::Invalid("jobs must be at least 1".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Composition resolver settings derived from this config.
    pub fn composition_settings(&self) -> CompositionSettings {
        CompositionSettings {
            dedupe: self.dedupe,
            ..CompositionSettings::default()
        }
    }
}
