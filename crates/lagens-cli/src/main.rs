use std::error::Error;
use std::io::Write;

use clap::{Parser, Subcommand};
use commands::{
    build::{self, BuildArgs},
    inspect::{self, InspectArgs},
    run::{self, RunArgs},
    scan::{self, ScanArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "lagens", about = "Lagged forecast ensemble builder")]
struct Cli {
    /// Log at debug level (RUST_LOG still overrides).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report the earliest and latest runs in an archive.
    Scan(ScanArgs),
    /// Assemble the lagged ensemble for a single target issuance time.
    Build(BuildArgs),
    /// Build every missing lagged ensemble over the archive's range.
    Run(RunArgs),
    /// Summarise a persisted lagged ensemble.
    Inspect(InspectArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| {
        writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
    })
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Scan(args) => scan::run(&args),
        Command::Build(args) => build::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Inspect(args) => inspect::run(&args),
    }
}
