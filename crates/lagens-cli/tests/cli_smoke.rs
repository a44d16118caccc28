use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use lagens_core::{epoch_seconds, parse_issuance, Dataset, RunKey, Variable};
use lagens_pipeline::serde::encode_dataset;
use tempfile::tempdir;

fn lagens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lagens"))
        .args(args)
        .output()
        .expect("run lagens")
}

fn write_run(root: &Path, issuance: &str, steps: usize) {
    let issued = parse_issuance(issuance).expect("issuance");
    let start = epoch_seconds(issued);
    let mut ds = Dataset::new();
    ds.dims.insert("time".into(), steps);
    ds.dims.insert("height2".into(), 1);
    ds.coords.insert(
        "time".into(),
        Variable::new(["time"], (0..steps).map(|step| Some(start + 3600.0 * step as f64)).collect()),
    );
    ds.coords
        .insert("height2".into(), Variable::new(["height2"], vec![Some(2.0)]));
    ds.data_vars.insert(
        "air_temperature_2m".into(),
        Variable::new(["time", "height2"], vec![Some(273.15); steps]),
    );
    ds.data_vars
        .insert("forecast_reference_time".into(), Variable::scalar(start));

    let dir = root.join(RunKey::from_instant(issued).relative_path());
    fs::create_dir_all(&dir).expect("run dir");
    fs::write(dir.join("meps_sfc_00.json"), encode_dataset(&ds).expect("encode"))
        .expect("write member");
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn scan_run_and_inspect() {
    let temp = tempdir().expect("tempdir");
    let archive = temp.path().join("archive");
    let out = temp.path().join("out");
    for hour in ["20240101T00Z", "20240101T01Z", "20240101T02Z", "20240101T03Z"] {
        write_run(&archive, hour, 6);
    }
    let archive_arg = archive.to_str().expect("utf8 path");
    let out_arg = out.to_str().expect("utf8 path");

    let scan = lagens(&["scan", "--archive", archive_arg]);
    assert!(scan.status.success(), "scan failed: {scan:?}");
    let text = stdout(&scan);
    assert!(text.contains("earliest: 20240101T00Z"));
    assert!(text.contains("latest: 20240101T03Z"));

    let report = temp.path().join("report.json");
    let run = lagens(&[
        "run",
        "--archive",
        archive_arg,
        "--out",
        out_arg,
        "--report",
        report.to_str().expect("utf8 path"),
    ]);
    assert!(run.status.success(), "run failed: {run:?}");
    let text = stdout(&run);
    assert!(text.contains("Done!"));
    assert!(text.contains("1 targets: 1 built, 0 skipped, 0 failed"));

    let parsed: serde_json::Value =
        serde_json::from_slice(&fs::read(&report).expect("report")).expect("report json");
    assert_eq!(parsed["first_target"], "20240101T03Z");
    assert_eq!(parsed["outcomes"][0]["status"]["state"], "built");

    let artifact = out.join("mens_lagged_ensemble_20240101T03Z.json");
    let inspect = lagens(&["inspect", artifact.to_str().expect("utf8 path")]);
    assert!(inspect.status.success(), "inspect failed: {inspect:?}");
    let text = stdout(&inspect);
    assert!(text.contains("members: 3"));
    assert!(text.contains("time steps: 4"));
    assert!(text.contains("reference time: 20240101T03Z"));
}

#[test]
fn build_with_lag_override_writes_requested_file() {
    let temp = tempdir().expect("tempdir");
    let archive = temp.path().join("archive");
    for hour in ["20240101T10Z", "20240101T11Z"] {
        write_run(&archive, hour, 4);
    }
    let target_file = temp.path().join("single.json");

    let build = lagens(&[
        "build",
        "--archive",
        archive.to_str().expect("utf8 path"),
        "--out",
        temp.path().to_str().expect("utf8 path"),
        "--lag-depth",
        "2",
        "--target",
        "2024-01-01T11:00:00Z",
        "--out-file",
        target_file.to_str().expect("utf8 path"),
    ]);
    assert!(build.status.success(), "build failed: {build:?}");
    assert!(stdout(&build).contains("members: 2"));
    assert!(target_file.exists());
}

#[test]
fn missing_window_run_fails_the_build() {
    let temp = tempdir().expect("tempdir");
    let archive = temp.path().join("archive");
    write_run(&archive, "20240101T11Z", 4);

    let build = lagens(&[
        "build",
        "--archive",
        archive.to_str().expect("utf8 path"),
        "--out",
        temp.path().to_str().expect("utf8 path"),
        "--target",
        "20240101T11Z",
    ]);
    assert!(!build.status.success());
    assert!(String::from_utf8_lossy(&build.stderr).contains("run_not_found"));
}

#[test]
fn run_requires_an_archive_without_config() {
    let temp = tempdir().expect("tempdir");
    let run = lagens(&["run", "--out", temp.path().to_str().expect("utf8 path")]);
    assert!(!run.status.success());
}
