use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use lagens_core::{compact_token, from_epoch_seconds, MEMBER_DIM, REFERENCE_TIME_VAR, TIME_DIM};
use lagens_pipeline::serde::read_dataset;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Artifact produced by `lagens run` or `lagens build`.
    pub artifact: PathBuf,
}

pub fn run(args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let dataset = read_dataset(&args.artifact)?;
    let reference = dataset
        .data_vars
        .get(REFERENCE_TIME_VAR)
        .and_then(|var| var.max_value())
        .and_then(from_epoch_seconds)
        .map(compact_token)
        .unwrap_or_else(|| "unknown".to_string());
    println!("members: {}", dataset.dim_len(MEMBER_DIM).unwrap_or(0));
    println!("time steps: {}", dataset.dim_len(TIME_DIM).unwrap_or(0));
    println!("reference time: {reference}");
    if let Some(runs) = dataset.attrs.get("lagged_runs") {
        println!("lagged runs: {runs}");
    }
    Ok(())
}
