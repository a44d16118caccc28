use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use lagens_pipeline::{run_pipeline, serde::to_canonical_json_bytes};

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Also write the per-target report as JSON to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let report = run_pipeline(&config)?;
    if let Some(path) = &args.report {
        fs::write(path, to_canonical_json_bytes(&report)?)?;
    }
    println!("Done!");
    for line in report.summary_lines() {
        println!("{line}");
    }
    Ok(())
}
