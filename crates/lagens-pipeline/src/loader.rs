use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lagens_core::{Dataset, ErrorInfo, LagError, RunKey};
use log::debug;

use crate::archive::{run_path, ArchiveIndex};
use crate::schema::{legacy_names, normalize_member};
use crate::serde::read_dataset;

/// Loads every member of the run issued at `instant`, normalised to canonical names.
///
/// Fails with [`LagError::NotFound`] when the archive has no such run.
pub fn load_run(archive: &ArchiveIndex, instant: DateTime<Utc>) -> Result<Vec<Dataset>, LagError> {
    let key = RunKey::from_instant(instant);
    let dir = archive.run_dir(instant).ok_or_else(|| {
        LagError::NotFound(
            ErrorInfo::new("run_not_found", "run directory does not exist")
                .with_context("run", key.compact())
                .with_context(
                    "expected",
                    run_path(archive.root(), &key).display().to_string(),
                ),
        )
    })?;
    load_run_dir(dir)
}

/// Loads and normalises every member file in a run directory, in file-name order.
pub fn load_run_dir(dir: &Path) -> Result<Vec<Dataset>, LagError> {
    let files = member_files(dir)?;
    if files.is_empty() {
        return Err(LagError::Schema(
            ErrorInfo::new("empty_run", "run directory holds no member files")
                .with_context("dir", dir.display().to_string()),
        ));
    }
    files
        .iter()
        .map(|path| {
            let member = read_dataset(path)?;
            let legacy = legacy_names(&member);
            if !legacy.is_empty() {
                debug!("normalising {legacy:?} in {}", path.display());
            }
            normalize_member(member)
                .map_err(|err| err.with_context("member", path.display().to_string()))
        })
        .collect()
}

/// Member files of a run directory, sorted by name.
pub fn member_files(dir: &Path) -> Result<Vec<PathBuf>, LagError> {
    let io_error = |err: std::io::Error| {
        let info = ErrorInfo::new("run_list", err.to_string())
            .with_context("dir", dir.display().to_string());
        if err.kind() == std::io::ErrorKind::NotFound {
            LagError::NotFound(info)
        } else {
            LagError::Io(info)
        }
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        if entry.file_type().map_err(io_error)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
