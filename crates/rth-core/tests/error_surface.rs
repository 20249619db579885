use std::path::Path;

use rth_core::errors::{ErrorInfo, HarnessError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("name", "foo")
        .with_context("reason", "example")
}

#[test]
fn not_found_surface() {
    let err = HarnessError::not_found("dep_not_found", "foo");
    assert_eq!(err.code(), "dep_not_found");
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("foo"));
    assert!(matches!(err, HarnessError::NotFound(_)));
}

#[test]
fn mismatch_records_both_sides() {
    let err = HarnessError::mismatch("version_mismatch", "foo", "2.0.0", "1.0.0");
    let context = &err.info().context;
    assert_eq!(context["expected"], "2.0.0");
    assert_eq!(context["actual"], "1.0.0");
    assert!(err.to_string().contains("expected 2.0.0, found 1.0.0"));
}

#[test]
fn contract_surface() {
    let err = HarnessError::Contract(sample_info("unsupported_source", "pkg ref"));
    assert_eq!(err.code(), "unsupported_source");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn io_surface_carries_path() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = HarnessError::io("term_read", Path::new("/tmp/missing.app"), io);
    assert_eq!(err.code(), "term_read");
    assert_eq!(err.info().context["path"], "/tmp/missing.app");
}

#[test]
fn display_includes_hint() {
    let err = HarnessError::Build(sample_info("build_failed", "compile").with_hint("check deps"));
    let text = err.to_string();
    assert!(text.starts_with("build error: compile (code: build_failed)"));
    assert!(text.ends_with("| hint: check deps"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = HarnessError::not_found("lock_not_found", "bar");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "NotFound");
    assert_eq!(json["detail"]["code"], "lock_not_found");
    let back: HarnessError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, err);
}
