mod common;

use std::fs;

use common::{hour, write_run};
use lagens_core::LagError;
use lagens_pipeline::{scan_extremes, ArchiveIndex};
use tempfile::tempdir;

#[test]
fn extremes_span_oldest_and_newest_runs() {
    let temp = tempdir().expect("tempdir");
    for offset in [5, 0, 27, 12] {
        write_run(temp.path(), hour(offset), 1, 3);
    }

    let range = scan_extremes(temp.path())
        .expect("scan")
        .expect("non-empty archive");
    assert_eq!(range.earliest, hour(0));
    assert_eq!(range.latest, hour(27));

    let index = ArchiveIndex::scan(temp.path()).expect("scan");
    assert_eq!(index.len(), 4);
    assert!(index.run_dir(hour(12)).is_some());
    assert!(index.run_dir(hour(13)).is_none());
}

#[test]
fn non_run_directories_are_ignored() {
    let temp = tempdir().expect("tempdir");
    write_run(temp.path(), hour(3), 1, 3);

    for junk in ["meta/notes", "2024/13/01/00", "2024/01/01/ab", "2024/01/32/00"] {
        let dir = temp.path().join(junk);
        fs::create_dir_all(&dir).expect("junk dir");
        fs::write(dir.join("readme.txt"), b"not a run").expect("junk file");
    }
    fs::create_dir_all(temp.path().join("2024/01/01/09")).expect("empty run dir");

    let index = ArchiveIndex::scan(temp.path()).expect("scan");
    assert_eq!(index.len(), 1);
    let range = index.require_extremes().expect("range");
    assert_eq!(range.earliest, hour(3));
    assert_eq!(range.latest, hour(3));
}

#[test]
fn empty_archive_has_no_range() {
    let temp = tempdir().expect("tempdir");
    assert!(scan_extremes(temp.path()).expect("scan").is_none());

    let index = ArchiveIndex::scan(temp.path()).expect("scan");
    assert!(index.is_empty());
    let err = index.require_extremes().expect_err("empty archive");
    assert!(matches!(err, LagError::Archive(_)));
    assert_eq!(err.code(), "archive_empty");
    assert!(!err.is_recoverable());
}

#[test]
fn missing_root_is_an_archive_error() {
    let temp = tempdir().expect("tempdir");
    let err = ArchiveIndex::scan(&temp.path().join("absent")).expect_err("missing root");
    assert_eq!(err.code(), "archive_missing");
}
