use std::fs;
use std::path::Path;

use rth_core::errors::HarnessError;
use rth_fixture::{create_app, create_compiled_app, create_empty_app};
use rth_verify::{verify, Expectation, HarnessConfig, Verifier};
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn lib_dir(root: &Path, name: &str) -> std::path::PathBuf {
    root.join("_build").join("default").join("lib").join(name)
}

#[test]
fn dep_with_matching_version_passes() {
    let root = project();
    create_empty_app(&lib_dir(root.path(), "foo"), "foo", "1.0.0", &[]).unwrap();

    verify(root.path(), &[Expectation::dep("foo"), Expectation::dep_vsn("foo", "1.0.0")]).unwrap();
}

#[test]
fn dep_with_other_version_is_a_mismatch() {
    let root = project();
    create_empty_app(&lib_dir(root.path(), "foo"), "foo", "1.0.0", &[]).unwrap();

    let err = verify(root.path(), &[Expectation::dep_vsn("foo", "2.0.0")]).unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch(_)));
    assert_eq!(err.code(), "version_mismatch");
    assert_eq!(err.info().context["expected"], "2.0.0");
    assert_eq!(err.info().context["actual"], "1.0.0");
}

#[test]
fn missing_app_and_dep_are_not_found() {
    let root = project();
    create_empty_app(&lib_dir(root.path(), "foo"), "foo", "1.0.0", &[]).unwrap();

    let err = verify(root.path(), &[Expectation::app("bar")]).unwrap_err();
    assert_eq!(err.code(), "app_not_found");
    let err = verify(root.path(), &[Expectation::dep("bar")]).unwrap_err();
    assert_eq!(err.code(), "dep_not_found");
    assert!(matches!(err, HarnessError::NotFound(_)));
}

#[test]
fn empty_project_passes_empty_expectations() {
    let root = project();
    verify(root.path(), &[]).unwrap();
}

#[test]
fn validity_filters_split_apps() {
    let root = project();
    // compiled resource, no modules: valid
    create_empty_app(&lib_dir(root.path(), "good"), "good", "0.1.0", &[]).unwrap();
    // sources only: invalid
    create_app(&lib_dir(root.path(), "bad"), "bad", "0.1.0", &[]).unwrap();

    verify(
        root.path(),
        &[
            Expectation::app("good"),
            Expectation::app("bad"),
            Expectation::valid_app("good"),
            Expectation::invalid_app("bad"),
        ],
    )
    .unwrap();

    let err = verify(root.path(), &[Expectation::valid_app("bad")]).unwrap_err();
    assert_eq!(err.code(), "app_not_found");
    let err = verify(root.path(), &[Expectation::invalid_app("good")]).unwrap_err();
    assert_eq!(err.code(), "app_not_found");
}

#[test]
fn missing_beam_makes_app_invalid() {
    let root = project();
    let dir = lib_dir(root.path(), "half");
    create_compiled_app(&dir, "half", "1.0.0", &["half", "half_sup"], &[]).unwrap();
    verify(root.path(), &[Expectation::valid_app("half")]).unwrap();

    fs::remove_file(dir.join("ebin").join("half_sup.beam")).unwrap();
    verify(root.path(), &[Expectation::invalid_app("half")]).unwrap();
    let err = verify(root.path(), &[Expectation::valid_app("half")]).unwrap_err();
    assert_eq!(err.code(), "app_not_found");
}

#[test]
fn checkouts_are_found_by_name() {
    let root = project();
    create_app(&root.path().join("_checkouts").join("local"), "local", "0.2.0", &[]).unwrap();

    verify(root.path(), &[Expectation::checkout("local")]).unwrap();
    let err = verify(root.path(), &[Expectation::checkout("other")]).unwrap_err();
    assert_eq!(err.code(), "checkout_not_found");
}

#[test]
fn plugins_are_checked_by_version() {
    let root = project();
    let dir = root.path().join("_build").join("default").join("plugins").join("rp");
    create_empty_app(&dir, "rp", "3.1.0", &[]).unwrap();

    verify(root.path(), &[Expectation::plugin("rp"), Expectation::plugin_vsn("rp", "3.1.0")]).unwrap();
    let err = verify(root.path(), &[Expectation::plugin_vsn("rp", "3.2.0")]).unwrap_err();
    assert_eq!(err.code(), "version_mismatch");
    let err = verify(root.path(), &[Expectation::plugin("nope")]).unwrap_err();
    assert_eq!(err.code(), "plugin_not_found");
}

#[test]
fn legacy_lock_layout() {
    let root = project();
    write(
        &root.path().join("rebar.lock"),
        r#"[{<<"foo">>, {pkg, <<"foo">>, <<"1.0.0">>}, 0},
           {<<"bar">>, {git, "https://example.org/user/bar.git", {ref, "abc123"}}, 1}]."#,
    );

    verify(
        root.path(),
        &[
            Expectation::lock("foo"),
            Expectation::lock_vsn("foo", "1.0.0"),
            Expectation::lock_vsn("bar", "abc123"),
        ],
    )
    .unwrap();
    let err = verify(root.path(), &[Expectation::lock("baz")]).unwrap_err();
    assert_eq!(err.code(), "lock_not_found");
}

#[test]
fn versioned_lock_layout_ignores_metadata() {
    let root = project();
    write(
        &root.path().join("rebar.lock"),
        r#"{"1.2.0",
[{<<"foo">>,{pkg,<<"foo">>,<<"1.0.0">>},0}]}.
[
{pkg_hash,[
 {<<"foo">>, <<"ABCDEF">>}]}
]."#,
    );

    verify(root.path(), &[Expectation::lock_vsn("foo", "1.0.0")]).unwrap();
    let err = verify(root.path(), &[Expectation::lock_vsn("foo", "1.1.0")]).unwrap_err();
    assert_eq!(err.code(), "version_mismatch");
}

#[test]
fn branch_locked_git_dep_cannot_be_version_checked() {
    let root = project();
    write(
        &root.path().join("rebar.lock"),
        r#"[{<<"a">>, {git, "https://example.org/user/a.git", {branch, "master"}}, 0}]."#,
    );

    verify(root.path(), &[Expectation::lock("a")]).unwrap();
    let err = verify(root.path(), &[Expectation::lock_vsn("a", "master")]).unwrap_err();
    assert_eq!(err.code(), "unsupported_lock_source");
    assert!(matches!(err, HarnessError::Contract(_)));
}

#[test]
fn tarball_and_file_checks() {
    let root = project();
    write(&root.path().join("_build/rel/myrel/myrel-0.1.0.tar.gz"), "tar");
    write(&root.path().join("priv/data.txt"), "data");
    fs::create_dir_all(root.path().join("priv/dir")).unwrap();

    verify(
        root.path(),
        &[Expectation::tar("myrel", "0.1.0"), Expectation::file("priv/data.txt")],
    )
    .unwrap();

    let err = verify(root.path(), &[Expectation::tar("myrel", "0.2.0")]).unwrap_err();
    assert_eq!(err.code(), "tar_not_found");
    let err = verify(root.path(), &[Expectation::file("priv/dir")]).unwrap_err();
    assert_eq!(err.code(), "file_not_found");
    let err = verify(root.path(), &[Expectation::file("missing.txt")]).unwrap_err();
    assert_eq!(err.code(), "file_not_found");
}

#[test]
fn first_failing_expectation_wins() {
    let root = project();
    create_empty_app(&lib_dir(root.path(), "foo"), "foo", "1.0.0", &[]).unwrap();

    let err = verify(
        root.path(),
        &[
            Expectation::dep("foo"),
            Expectation::dep_vsn("foo", "9.9.9"),
            Expectation::tar("never", "1"),
        ],
    )
    .unwrap_err();
    assert_eq!(err.code(), "version_mismatch");
}

#[test]
fn first_profile_wins_for_duplicate_names() {
    let root = project();
    let build = root.path().join("_build");
    create_empty_app(&build.join("default/lib/foo"), "foo", "1.0.0", &[]).unwrap();
    create_empty_app(&build.join("test/lib/foo"), "foo", "2.0.0", &[]).unwrap();

    verify(root.path(), &[Expectation::dep_vsn("foo", "1.0.0")]).unwrap();
}

#[test]
fn custom_layout_from_config() {
    let root = project();
    create_empty_app(&root.path().join("out/prod/lib/foo"), "foo", "1.0.0", &[]).unwrap();
    let config = HarnessConfig::from_toml_str("build_dir = \"out\"").unwrap();

    let verifier = Verifier::new().with_config(config);
    verifier.verify(root.path(), &[Expectation::dep("foo")]).unwrap();

    let err = verify(root.path(), &[Expectation::dep("foo")]).unwrap_err();
    assert_eq!(err.code(), "dep_not_found");
}

#[test]
fn expectations_deserialize_from_json() {
    let json = r#"[
        {"kind": "dep", "name": "foo", "version": "1.0.0"},
        {"kind": "app", "name": "bar", "filter": "invalid"},
        {"kind": "app", "name": "baz"},
        {"kind": "release", "name": "r", "version": "0.1.0", "dev_mode": true},
        {"kind": "file", "path": "priv/x"}
    ]"#;
    let parsed: Vec<Expectation> = serde_json::from_str(json).unwrap();
    assert_eq!(
        parsed,
        vec![
            Expectation::dep_vsn("foo", "1.0.0"),
            Expectation::invalid_app("bar"),
            Expectation::app("baz"),
            Expectation::release("r", "0.1.0", true),
            Expectation::file("priv/x"),
        ]
    );
}
