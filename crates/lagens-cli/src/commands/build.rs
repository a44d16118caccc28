use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use lagens_core::{compact_token, parse_issuance};
use lagens_pipeline::{build, persist_ensemble, ArchiveIndex};

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Target issuance time, `YYYYMMDDTHHZ` or RFC 3339.
    #[arg(long)]
    pub target: String,
    /// Write here instead of the canonical artifact path.
    #[arg(long)]
    pub out_file: Option<PathBuf>,
}

pub fn run(args: &BuildArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let target = parse_issuance(&args.target)?;
    let archive = ArchiveIndex::scan(&config.archive_root)?;
    let ensemble = build(&archive, target, config.lag_depth)?;
    let path = args
        .out_file
        .clone()
        .unwrap_or_else(|| config.artifact_path(target));
    let sha256 = persist_ensemble(&ensemble, &path)?;
    let runs: Vec<String> = ensemble.runs.iter().map(|run| compact_token(*run)).collect();
    println!("target: {}", compact_token(target));
    println!("runs: {}", runs.join(","));
    println!("members: {}", ensemble.member_count());
    println!("time steps: {}", ensemble.time_steps());
    println!("artifact: {} ({sha256})", path.display());
    Ok(())
}
