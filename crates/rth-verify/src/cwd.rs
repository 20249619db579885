use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rth_core::errors::HarnessError;
use tracing::warn;

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Scoped change of the process working directory.
///
/// The previous directory is restored when the guard drops, on every exit
/// path. Guards serialise on a process-wide lock for their whole lifetime.
#[derive(Debug)]
pub struct CwdGuard {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl CwdGuard {
    /// Switches into `dir`.
    pub fn enter(dir: &Path) -> Result<Self, HarnessError> {
        let lock = CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous =
            env::current_dir().map_err(|err| HarnessError::io("cwd_read", Path::new("."), err))?;
        env::set_current_dir(dir).map_err(|err| HarnessError::io("cwd_enter", dir, err))?;
        Ok(Self {
            previous,
            _lock: lock,
        })
    }

    /// Directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            warn!(
                path = %self.previous.display(),
                error = %err,
                "failed to restore working directory"
            );
        }
    }
}
