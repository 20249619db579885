use std::env;
use std::fs;
use std::path::Path;

use rth_fixture::create_empty_app;
use rth_verify::{verify, Expectation};

// One test per binary: the working directory is process-wide.
#[test]
fn release_check_through_relative_root() {
    let base = tempfile::tempdir().unwrap();
    let root = base.path().join("proj");
    let rel = root.join("_build/default/rel/myrel");
    create_empty_app(&rel.join("lib/foo-1.0.0"), "foo", "1.0.0", &[]).unwrap();
    create_empty_app(&root.join("_build/default/lib/foo"), "foo", "1.0.0", &[]).unwrap();
    fs::create_dir_all(rel.join("releases/0.1.0")).unwrap();
    fs::write(
        rel.join("releases/0.1.0/myrel.rel"),
        r#"{release, {"myrel", "0.1.0"}, {erts, "14.0"}, [{foo, "1.0.0"}]}."#,
    )
    .unwrap();

    let start = env::current_dir().unwrap();
    env::set_current_dir(base.path()).unwrap();
    let result = verify(
        Path::new("proj"),
        &[
            Expectation::dep_vsn("foo", "1.0.0"),
            Expectation::release("myrel", "0.1.0", false),
        ],
    );
    let cwd_after = env::current_dir().unwrap();
    env::set_current_dir(&start).unwrap();

    result.unwrap();
    assert_eq!(
        cwd_after.canonicalize().unwrap(),
        base.path().canonicalize().unwrap()
    );
}
