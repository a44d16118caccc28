use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use lagens_pipeline::{load_config, PipelineConfig};

pub mod build;
pub mod inspect;
pub mod run;
pub mod scan;

/// Configuration flags shared by `build` and `run`.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// YAML configuration file; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Archive root holding <year>/<month>/<day>/<hour> run directories.
    #[arg(long)]
    pub archive: Option<PathBuf>,
    /// Output directory for lagged ensemble artifacts.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Number of consecutive hourly runs per ensemble.
    #[arg(long)]
    pub lag_depth: Option<usize>,
    /// Expected number of forecast time steps (reported only).
    #[arg(long)]
    pub target_steps: Option<usize>,
}

impl ConfigArgs {
    /// Resolves the effective configuration: file first, then flag overrides.
    pub fn resolve(&self) -> Result<PipelineConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let archive = self
                    .archive
                    .clone()
                    .ok_or("--archive is required without --config")?;
                let out = self
                    .out
                    .clone()
                    .ok_or("--out is required without --config")?;
                PipelineConfig::new(archive, out)
            }
        };
        if let Some(archive) = &self.archive {
            config.archive_root = archive.clone();
        }
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(lag_depth) = self.lag_depth {
            config.lag_depth = lag_depth;
        }
        if let Some(steps) = self.target_steps {
            config.target_forecast_steps = steps;
        }
        config.validate()?;
        Ok(config)
    }
}
