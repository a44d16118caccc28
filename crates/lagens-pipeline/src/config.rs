use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lagens_core::{compact_token, ErrorInfo, LagError};
use serde::{Deserialize, Serialize};

use crate::serde::{from_yaml_slice, to_yaml_string};

/// Placeholder substituted with the compact issuance token in artifact names.
pub const TIME_PLACEHOLDER: &str = "{time}";

/// Largest accepted lag depth: one week of hourly runs.
pub const MAX_LAG_DEPTH: usize = 24 * 7;

fn config_error(code: &str, message: impl Into<String>) -> LagError {
    LagError::Config(ErrorInfo::new(code, message))
}

/// Rejects lag depths outside `1..=MAX_LAG_DEPTH`.
pub fn check_lag_depth(lag_depth: usize) -> Result<(), LagError> {
    if lag_depth == 0 {
        return Err(config_error("lag_depth", "lag depth must be at least one run"));
    }
    if lag_depth > MAX_LAG_DEPTH {
        return Err(LagError::Config(
            ErrorInfo::new("lag_depth", format!("lag depth exceeds {MAX_LAG_DEPTH} runs"))
                .with_context("lag_depth", lag_depth.to_string()),
        ));
    }
    Ok(())
}

/// Settings of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the year/month/day/hour run archive.
    pub archive_root: PathBuf,
    /// Flat directory receiving one artifact per target issuance time.
    pub output_dir: PathBuf,
    /// Number of consecutive hourly runs merged into one ensemble.
    #[serde(default = "PipelineConfig::default_lag_depth")]
    pub lag_depth: usize,
    /// Expected forecast length in time steps. Only reported, never enforced.
    #[serde(default = "PipelineConfig::default_target_forecast_steps")]
    pub target_forecast_steps: usize,
    /// Artifact file name; must contain `{time}`.
    #[serde(default = "PipelineConfig::default_filename_template")]
    pub filename_template: String,
}

impl PipelineConfig {
    fn default_lag_depth() -> usize {
        3
    }

    fn default_target_forecast_steps() -> usize {
        62
    }

    fn default_filename_template() -> String {
        format!("mens_lagged_ensemble_{TIME_PLACEHOLDER}.json")
    }

    /// Configuration with default knobs for the given directories.
    pub fn new(archive_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
            output_dir: output_dir.into(),
            lag_depth: Self::default_lag_depth(),
            target_forecast_steps: Self::default_target_forecast_steps(),
            filename_template: Self::default_filename_template(),
        }
    }

    /// Rejects settings no run could succeed with.
    pub fn validate(&self) -> Result<(), LagError> {
        check_lag_depth(self.lag_depth)?;
        if !self.filename_template.contains(TIME_PLACEHOLDER) {
            return Err(LagError::Config(
                ErrorInfo::new("filename_template", "artifact template lacks {time}")
                    .with_context("template", self.filename_template.clone()),
            ));
        }
        if self.filename_template.contains('/') || self.filename_template.contains('\\') {
            return Err(LagError::Config(
                ErrorInfo::new("filename_template", "artifact template must be a bare file name")
                    .with_context("template", self.filename_template.clone()),
            ));
        }
        Ok(())
    }

    /// File name of the artifact for `target`.
    pub fn artifact_name(&self, target: DateTime<Utc>) -> String {
        self.filename_template
            .replace(TIME_PLACEHOLDER, &compact_token(target))
    }

    /// Canonical artifact path for `target`; its existence marks the target as done.
    pub fn artifact_path(&self, target: DateTime<Utc>) -> PathBuf {
        self.output_dir.join(self.artifact_name(target))
    }

    /// Produces a YAML representation of the configuration.
    pub fn to_yaml_string(&self) -> Result<String, LagError> {
        to_yaml_string(self)
    }
}

/// Loads a configuration file; relative paths resolve against the file's directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, LagError> {
    let config_path = path.as_ref();
    let bytes = fs::read(config_path).map_err(|err| {
        LagError::Config(
            ErrorInfo::new("config_read", err.to_string())
                .with_context("path", config_path.display().to_string()),
        )
    })?;
    let mut config: PipelineConfig = from_yaml_slice(&bytes)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    if config.archive_root.is_relative() {
        config.archive_root = base_dir.join(&config.archive_root);
    }
    if config.output_dir.is_relative() {
        config.output_dir = base_dir.join(&config.output_dir);
    }
    config.validate()?;
    Ok(config)
}
