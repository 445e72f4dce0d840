//! Scoped change of the process working directory.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Restores the previous working directory when dropped.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    /// Change into `dir`, remembering where we came from.
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        debug!("Entered {}", dir.display());
        Ok(Self { previous })
    }

    /// Directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            warn!(
                "Failed to restore working directory {}: {e}",
                self.previous.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_guard_restores_on_drop() {
        let before = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().canonicalize().unwrap();

        {
            let guard = WorkingDirGuard::enter(&target).unwrap();
            assert_eq!(guard.previous(), before);
            assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), target);
        }

        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn test_enter_missing_dir_leaves_cwd_untouched() {
        let before = std::env::current_dir().unwrap();
        let result = WorkingDirGuard::enter(Path::new("/nonexistent/buddy/project"));
        assert!(result.is_err());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
