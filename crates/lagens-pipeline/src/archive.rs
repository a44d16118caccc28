use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use lagens_core::{ErrorInfo, LagError, RunKey};
use log::{debug, warn};
use walkdir::WalkDir;

/// Earliest and latest issuance instants present in an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Issuance time of the oldest run.
    pub earliest: DateTime<Utc>,
    /// Issuance time of the newest run.
    pub latest: DateTime<Utc>,
}

/// Typed index of the runs in an archive, built once by a directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveIndex {
    root: PathBuf,
    runs: BTreeMap<RunKey, PathBuf>,
}

impl ArchiveIndex {
    /// Walks `root` and records every non-empty directory whose last four path
    /// segments read as year/month/day/hour.
    ///
    /// Other directories are skipped: archives routinely carry metadata folders
    /// next to the run tree.
    pub fn scan(root: &Path) -> Result<Self, LagError> {
        if !root.is_dir() {
            return Err(LagError::Archive(
                ErrorInfo::new("archive_missing", "archive root is not a directory")
                    .with_context("root", root.display().to_string()),
            ));
        }
        let mut populated = BTreeSet::new();
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(parent) = entry.path().parent() {
                populated.insert(parent.to_path_buf());
            }
        }

        let mut runs: BTreeMap<RunKey, PathBuf> = BTreeMap::new();
        for dir in populated {
            let Some(key) = classify_dir(&dir) else {
                debug!("ignoring non-run directory {}", dir.display());
                continue;
            };
            if let Some(existing) = runs.get(&key) {
                warn!(
                    "run {key} found at both {} and {}; keeping the former",
                    existing.display(),
                    dir.display()
                );
                continue;
            }
            runs.insert(key, dir);
        }
        Ok(Self {
            root: root.to_path_buf(),
            runs,
        })
    }

    /// Archive root that was scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of runs found.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True when the archive holds no run.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Directory of the run issued at `instant`, if present.
    pub fn run_dir(&self, instant: DateTime<Utc>) -> Option<&Path> {
        self.runs
            .get(&RunKey::from_instant(instant))
            .map(PathBuf::as_path)
    }

    /// Oldest and newest issuance times, or `None` for an empty archive.
    pub fn extremes(&self) -> Option<TimeRange> {
        let earliest = self.runs.keys().next()?;
        let latest = self.runs.keys().next_back()?;
        Some(TimeRange {
            earliest: earliest.instant(),
            latest: latest.instant(),
        })
    }

    /// Like [`ArchiveIndex::extremes`], failing when the archive holds no run.
    pub fn require_extremes(&self) -> Result<TimeRange, LagError> {
        self.extremes().ok_or_else(|| {
            LagError::Archive(
                ErrorInfo::new("archive_empty", "no run directories found")
                    .with_context("root", self.root.display().to_string())
                    .with_hint("expected <root>/<year>/<month>/<day>/<hour>/<member files>"),
            )
        })
    }
}

/// Scans `root` and returns the oldest and newest run issuance times.
pub fn scan_extremes(root: &Path) -> Result<Option<TimeRange>, LagError> {
    Ok(ArchiveIndex::scan(root)?.extremes())
}

/// Reads the run key encoded in the last four segments of `dir`, if any.
pub fn classify_dir(dir: &Path) -> Option<RunKey> {
    let mut tail = dir.components().rev().take(4).map(|component| match component {
        Component::Normal(name) => name.to_str(),
        _ => None,
    });
    let hour = tail.next()??;
    let day = tail.next()??;
    let month = tail.next()??;
    let year = tail.next()??;
    RunKey::from_segments([year, month, day, hour])
}

/// Canonical location of a run below `root`.
pub fn run_path(root: &Path, key: &RunKey) -> PathBuf {
    root.join(key.relative_path())
}
