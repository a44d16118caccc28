#![deny(missing_docs)]
#![doc = "Lagged ensemble construction from an hourly forecast run archive."]

/// Archive scanning and the typed run index.
pub mod archive;
/// Lagged ensemble assembly for one target issuance time.
pub mod assemble;
/// Member concatenation, time joins and reference-time stamping.
pub mod combine;
/// Pipeline configuration.
pub mod config;
/// Idempotent driver over the archive's range.
pub mod dispatch;
/// Artifact digests.
pub mod hash;
/// Run loading.
pub mod loader;
/// Per-target outcomes and the final summary.
pub mod report;
/// Coordinate alias table and member normalisation.
pub mod schema;
/// Canonical JSON and YAML helpers, dataset file IO.
pub mod serde;

pub use archive::{scan_extremes, ArchiveIndex, TimeRange};
pub use assemble::{build, lag_window, LaggedEnsemble};
pub use config::{load_config, PipelineConfig};
pub use dispatch::{first_target, persist_ensemble, process_target, run_pipeline, target_times};
pub use loader::load_run;
pub use report::{PipelineReport, TargetOutcome, TargetState, TargetStatus};
pub use schema::{normalize_member, CoordinateAlias, COORDINATE_ALIASES};
