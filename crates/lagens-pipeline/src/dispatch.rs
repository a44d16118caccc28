use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use lagens_core::{compact_token, ErrorInfo, LagError};
use log::{info, warn};
use tempfile::NamedTempFile;

use crate::archive::{ArchiveIndex, TimeRange};
use crate::assemble::{build, LaggedEnsemble};
use crate::config::PipelineConfig;
use crate::hash::digest_hex;
use crate::report::{PipelineReport, TargetOutcome, TargetStatus};
use crate::serde::encode_dataset;

fn io_error(code: &str, path: &Path, err: impl ToString) -> LagError {
    LagError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// First target with a full lag window: `lag_depth` hours after the oldest run.
///
/// `None` when that instant is not representable.
pub fn first_target(range: &TimeRange, lag_depth: usize) -> Option<DateTime<Utc>> {
    let hours = i64::try_from(lag_depth).ok()?;
    range.earliest.checked_add_signed(Duration::try_hours(hours)?)
}

/// Hourly targets from [`first_target`] up to and including the newest run.
pub fn target_times(range: &TimeRange, lag_depth: usize) -> Vec<DateTime<Utc>> {
    let mut targets = Vec::new();
    let mut next = first_target(range, lag_depth);
    while let Some(target) = next.filter(|target| *target <= range.latest) {
        targets.push(target);
        next = target.checked_add_signed(Duration::hours(1));
    }
    targets
}

/// Builds every missing artifact over the archive's range.
///
/// Only an empty archive or invalid configuration aborts. Recoverable per-target
/// failures are recorded in the report and the loop carries on with the next hour.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport, LagError> {
    config.validate()?;
    let archive = ArchiveIndex::scan(&config.archive_root)?;
    let range = archive.require_extremes()?;
    let first = first_target(&range, config.lag_depth).ok_or_else(|| {
        LagError::Config(
            ErrorInfo::new("lag_depth", "first target leaves the representable time range")
                .with_context("earliest_run", compact_token(range.earliest)),
        )
    })?;
    fs::create_dir_all(&config.output_dir)
        .map_err(|err| io_error("output_dir", &config.output_dir, err))?;
    info!(
        "archive holds {} runs from {} to {}",
        archive.len(),
        compact_token(range.earliest),
        compact_token(range.latest)
    );

    let mut outcomes = Vec::new();
    for target in target_times(&range, config.lag_depth) {
        let outcome = process_target(&archive, config, target);
        if let TargetStatus::Failed { error } = &outcome.status {
            if !error.is_recoverable() {
                return Err(error.clone());
            }
        }
        outcomes.push(outcome);
    }

    Ok(PipelineReport {
        lag_depth: config.lag_depth,
        earliest_run: compact_token(range.earliest),
        latest_run: compact_token(range.latest),
        first_target: compact_token(first),
        outcomes,
    })
}

/// Skips, builds or records the failure of a single target.
pub fn process_target(
    archive: &ArchiveIndex,
    config: &PipelineConfig,
    target: DateTime<Utc>,
) -> TargetOutcome {
    let artifact = config.artifact_path(target);
    let status = if artifact.is_file() {
        info!("lagged ensemble for {} exists, skipping", compact_token(target));
        TargetStatus::Skipped
    } else {
        info!("building lagged ensemble for {}", compact_token(target));
        match build_and_persist(archive, config, target, &artifact) {
            Ok(status) => status,
            Err(error) => {
                warn!("cannot build lagged ensemble for {}: {error}", compact_token(target));
                TargetStatus::Failed { error }
            }
        }
    };
    TargetOutcome {
        target: compact_token(target),
        artifact: artifact.display().to_string(),
        status,
    }
}

fn build_and_persist(
    archive: &ArchiveIndex,
    config: &PipelineConfig,
    target: DateTime<Utc>,
    artifact: &Path,
) -> Result<TargetStatus, LagError> {
    let ensemble = build(archive, target, config.lag_depth)?;
    if ensemble.time_steps() < config.target_forecast_steps {
        warn!(
            "{} keeps {} of {} expected time steps",
            compact_token(target),
            ensemble.time_steps(),
            config.target_forecast_steps
        );
    }
    let sha256 = persist_ensemble(&ensemble, artifact)?;
    Ok(TargetStatus::Built {
        members: ensemble.member_count(),
        time_steps: ensemble.time_steps(),
        sha256,
    })
}

/// Writes an ensemble to `path` atomically and returns the SHA256 of the bytes.
///
/// The data lands in a temporary file beside `path` and is renamed into place, so an
/// interrupted write never leaves a file at the completion path.
pub fn persist_ensemble(ensemble: &LaggedEnsemble, path: &Path) -> Result<String, LagError> {
    let bytes = encode_dataset(&ensemble.dataset)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| io_error("artifact_dir", dir, err))?;
    let mut staging =
        NamedTempFile::new_in(dir).map_err(|err| io_error("artifact_write", path, err))?;
    staging
        .write_all(&bytes)
        .and_then(|_| staging.as_file().sync_all())
        .map_err(|err| io_error("artifact_write", path, err))?;
    staging
        .persist(path)
        .map_err(|err| io_error("artifact_persist", path, err.error))?;
    Ok(digest_hex(&bytes))
}
