use chrono::{DateTime, Duration, Utc};
use lagens_core::{compact_token, Dataset, ErrorInfo, LagError, RunKey, TIME_DIM};
use log::debug;

use crate::archive::{run_path, ArchiveIndex};
use crate::combine::{concat_members, drop_incomplete_times, member_count, stamp_reference_time};
use crate::config::check_lag_depth;
use crate::loader::load_run;

/// Combined dataset for one target issuance time.
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedEnsemble {
    /// Nominal issuance time of the ensemble.
    pub target: DateTime<Utc>,
    /// Contributing run issuance times, most recent first.
    pub runs: Vec<DateTime<Utc>>,
    /// Members contributed by each run, aligned with `runs`.
    pub members_per_run: Vec<usize>,
    /// Reference time stamped on the merged dataset.
    pub reference_time: DateTime<Utc>,
    /// Merged data.
    pub dataset: Dataset,
}

impl LaggedEnsemble {
    /// Total number of members across all contributing runs.
    pub fn member_count(&self) -> usize {
        self.members_per_run.iter().sum()
    }

    /// Number of valid times that survived the inner join.
    pub fn time_steps(&self) -> usize {
        self.dataset.dim_len(TIME_DIM).unwrap_or(0)
    }
}

/// Issuance times of the runs feeding the ensemble for `target`, most recent first.
///
/// Stops early if an instant falls outside chrono's range.
pub fn lag_window(target: DateTime<Utc>, lag_depth: usize) -> Vec<DateTime<Utc>> {
    (0..lag_depth)
        .map_while(|lag| {
            let hours = i64::try_from(lag).ok()?;
            target.checked_sub_signed(Duration::try_hours(hours)?)
        })
        .collect()
}

/// Builds the lagged ensemble for `target` from `lag_depth` consecutive hourly runs.
///
/// Every run of the window must exist; a gap fails with [`LagError::NotFound`]
/// before any member is read.
pub fn build(
    archive: &ArchiveIndex,
    target: DateTime<Utc>,
    lag_depth: usize,
) -> Result<LaggedEnsemble, LagError> {
    check_lag_depth(lag_depth)?;
    let runs = lag_window(target, lag_depth);
    if runs.len() != lag_depth {
        return Err(LagError::Config(
            ErrorInfo::new("lag_depth", "lag window leaves the representable time range")
                .with_context("target", compact_token(target)),
        ));
    }
    if let Some(missing) = runs.iter().find(|run| archive.run_dir(**run).is_none()) {
        let key = RunKey::from_instant(*missing);
        return Err(LagError::NotFound(
            ErrorInfo::new("run_not_found", "lag window has a missing run")
                .with_context("target", compact_token(target))
                .with_context("run", key.compact())
                .with_context(
                    "expected",
                    run_path(archive.root(), &key).display().to_string(),
                ),
        ));
    }

    let mut per_run = Vec::with_capacity(runs.len());
    for run in &runs {
        let members = load_run(archive, *run)?;
        debug!("loaded {} members for run {}", members.len(), compact_token(*run));
        let combined = concat_members(&members)
            .map_err(|err| err.with_context("run", compact_token(*run)))?;
        per_run.push(combined);
    }
    let members_per_run: Vec<usize> = per_run.iter().map(member_count).collect();

    let merged = concat_members(&per_run)?;
    let mut dataset = drop_incomplete_times(&merged)?;
    if dataset.dim_len(TIME_DIM) == Some(0) {
        return Err(LagError::Schema(
            ErrorInfo::new("empty_ensemble", "no time step is shared by all members")
                .with_context("target", compact_token(target)),
        ));
    }
    let latest_run = runs.iter().max().copied();
    let reference_time = stamp_reference_time(&mut dataset, latest_run)?;

    let lagged = runs
        .iter()
        .map(|run| compact_token(*run))
        .collect::<Vec<_>>()
        .join(",");
    dataset.attrs.insert("lagged_runs".to_string(), lagged);
    dataset
        .attrs
        .insert("lag_depth".to_string(), lag_depth.to_string());

    Ok(LaggedEnsemble {
        target,
        runs,
        members_per_run,
        reference_time,
        dataset,
    })
}
