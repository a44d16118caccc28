#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use lagens_core::{epoch_seconds, Dataset, RunKey, Variable};
use lagens_pipeline::serde::encode_dataset;

pub const TEMPERATURE: &str = "air_temperature_2m";

/// 2024-01-01 at the given hour offset (may exceed 23).
pub fn hour(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(offset)
}

/// A single-member forecast issued at `issued` with hourly valid times.
pub fn member(issued: DateTime<Utc>, steps: usize, height: &str, base: f64) -> Dataset {
    let mut ds = Dataset::new();
    ds.dims.insert("time".into(), steps);
    ds.dims.insert(height.into(), 1);
    let times = (0..steps)
        .map(|step| Some(epoch_seconds(issued + Duration::hours(step as i64))))
        .collect();
    ds.coords.insert(
        "time".into(),
        Variable::new(["time"], times).with_attr("units", "seconds since 1970-01-01 00:00:00 +00:00"),
    );
    ds.coords
        .insert(height.into(), Variable::new([height], vec![Some(2.0)]).with_attr("units", "m"));
    let values = (0..steps).map(|step| Some(base + step as f64)).collect();
    ds.data_vars.insert(
        TEMPERATURE.into(),
        Variable::new(["time", height], values).with_attr("units", "K"),
    );
    ds.data_vars.insert(
        "forecast_reference_time".into(),
        Variable::scalar(epoch_seconds(issued)),
    );
    ds.attrs.insert("title".into(), "MEPS point forecast".into());
    ds
}

pub fn run_dir(root: &Path, issued: DateTime<Utc>) -> PathBuf {
    root.join(RunKey::from_instant(issued).relative_path())
}

pub fn write_member(root: &Path, issued: DateTime<Utc>, name: &str, dataset: &Dataset) -> PathBuf {
    let dir = run_dir(root, issued);
    fs::create_dir_all(&dir).expect("run dir");
    let path = dir.join(name);
    fs::write(&path, encode_dataset(dataset).expect("encode")).expect("write member");
    path
}

/// Writes `members` canonical members for the run issued at `issued`.
pub fn write_run(root: &Path, issued: DateTime<Utc>, members: usize, steps: usize) {
    for idx in 0..members {
        let name = format!("meps_sfc_{idx:02}.json");
        write_member(root, issued, &name, &member(issued, steps, "height2", 270.0 + idx as f64));
    }
}
