use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use lagens_core::compact_token;
use lagens_pipeline::ArchiveIndex;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Archive root to scan.
    #[arg(long)]
    pub archive: PathBuf,
}

pub fn run(args: &ScanArgs) -> Result<(), Box<dyn Error>> {
    let archive = ArchiveIndex::scan(&args.archive)?;
    let range = archive.require_extremes()?;
    println!("runs: {}", archive.len());
    println!("earliest: {}", compact_token(range.earliest));
    println!("latest: {}", compact_token(range.latest));
    Ok(())
}
