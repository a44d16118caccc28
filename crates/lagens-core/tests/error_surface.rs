use lagens_core::errors::{ErrorInfo, LagError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("target", "20240101T07Z")
        .with_context("run", "20240101T05Z")
}

#[test]
fn not_found_is_recoverable() {
    let err = LagError::NotFound(sample_info("run_not_found", "run directory missing"));
    assert_eq!(err.code(), "run_not_found");
    assert!(err.info().context.contains_key("run"));
    assert!(err.is_recoverable());
}

#[test]
fn archive_and_config_errors_are_fatal() {
    let archive = LagError::Archive(sample_info("archive_empty", "no runs"));
    let config = LagError::Config(sample_info("lag_depth", "lag depth is zero"));
    assert!(!archive.is_recoverable());
    assert!(!config.is_recoverable());
    assert!(LagError::Io(sample_info("artifact_write", "disk full")).is_recoverable());
    assert!(LagError::Schema(sample_info("schema_mismatch", "dims differ")).is_recoverable());
}

#[test]
fn display_includes_context_and_hint() {
    let err = LagError::Schema(
        ErrorInfo::new("schema_mismatch", "dimension mismatch")
            .with_context("variable", "air_temperature_2m")
            .with_hint("normalise height coordinates first"),
    );
    assert_eq!(
        err.to_string(),
        "schema error: dimension mismatch (code: schema_mismatch) | context: \
         [variable=air_temperature_2m] | hint: normalise height coordinates first"
    );
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = LagError::Io(ErrorInfo::new("artifact_write", "permission denied"));
    let value = serde_json::to_value(&err).expect("serialize");
    assert_eq!(value["family"], "Io");
    assert_eq!(value["detail"]["code"], "artifact_write");
    let back: LagError = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, err);
}
