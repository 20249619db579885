use std::env;
use std::fs;

use rth_verify::CwdGuard;

// One test per binary: the working directory is process-wide.
#[test]
fn guard_restores_previous_directory() {
    let start = env::current_dir().unwrap().canonicalize().unwrap();
    let target = tempfile::tempdir().unwrap();
    let target_path = target.path().canonicalize().unwrap();

    {
        let guard = CwdGuard::enter(&target_path).unwrap();
        assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), target_path);
        assert_eq!(guard.previous().canonicalize().unwrap(), start);
    }
    assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), start);

    // restored even when the scope exits early with an error
    let failing = || -> Result<(), String> {
        let _guard = CwdGuard::enter(&target_path).map_err(|err| err.to_string())?;
        fs::read_to_string("does-not-exist").map_err(|err| err.to_string())?;
        Ok(())
    };
    assert!(failing().is_err());
    assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), start);

    let err = CwdGuard::enter(&target_path.join("missing")).unwrap_err();
    assert_eq!(err.code(), "cwd_enter");
    assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), start);
}
