mod common;

use common::{hour, member, write_member, TEMPERATURE};
use lagens_core::MEMBER_DIM;
use lagens_pipeline::combine::concat_members;
use lagens_pipeline::schema::{legacy_names, HEIGHT_2M};
use lagens_pipeline::{load_run, normalize_member, ArchiveIndex};
use tempfile::tempdir;

#[test]
fn legacy_height_is_renamed_everywhere() {
    let legacy = member(hour(0), 3, "height6", 271.0);
    assert_eq!(legacy_names(&legacy), vec!["height6"]);

    let normalized = normalize_member(legacy.clone()).expect("normalize");
    assert!(legacy_names(&normalized).is_empty());
    assert_eq!(normalized.dim_len(HEIGHT_2M), Some(1));
    assert!(normalized.coords.contains_key(HEIGHT_2M));
    assert!(!normalized.coords.contains_key("height6"));
    let temperature = &normalized.data_vars[TEMPERATURE];
    assert_eq!(temperature.dims, vec!["time".to_string(), HEIGHT_2M.to_string()]);
    assert_eq!(temperature.values, legacy.data_vars[TEMPERATURE].values);
    assert_eq!(temperature.attrs.get("units").map(String::as_str), Some("K"));
}

#[test]
fn canonical_members_pass_through_untouched() {
    let canonical = member(hour(0), 3, HEIGHT_2M, 271.0);
    let normalized = normalize_member(canonical.clone()).expect("normalize");
    assert_eq!(normalized, canonical);
}

#[test]
fn mixed_schema_run_concatenates_after_loading() {
    let temp = tempdir().expect("tempdir");
    write_member(temp.path(), hour(6), "meps_sfc_00.json", &member(hour(6), 4, HEIGHT_2M, 270.0));
    write_member(temp.path(), hour(6), "meps_sfc_01.json", &member(hour(6), 4, "height6", 272.0));

    let index = ArchiveIndex::scan(temp.path()).expect("scan");
    let members = load_run(&index, hour(6)).expect("load run");
    assert_eq!(members.len(), 2);

    let merged = concat_members(&members).expect("concat");
    assert_eq!(merged.dim_len(MEMBER_DIM), Some(2));
    assert!(merged.coords.contains_key(HEIGHT_2M));
    assert!(!merged.dims.contains_key("height6"));
    assert!(!merged.coords.contains_key("height6"));
}

#[test]
fn unnormalized_members_do_not_line_up() {
    let members = vec![
        member(hour(6), 4, HEIGHT_2M, 270.0),
        member(hour(6), 4, "height6", 272.0),
    ];
    let err = concat_members(&members).expect_err("schema mismatch");
    assert_eq!(err.code(), "schema_mismatch");
}
