//! Removal of everything a launch created on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Registry of temporary paths, removed exactly once.
///
/// Shared through `Arc` between the launcher (normal and error returns) and the
/// signal handler (abrupt termination).
#[derive(Debug, Default)]
pub struct Teardown {
    paths: Mutex<Vec<PathBuf>>,
    done: AtomicBool,
}

impl Teardown {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created file or directory for removal.
    ///
    /// After [`Teardown::run`] the path is removed on the spot and `false` is returned.
    pub fn register(&self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_done() {
            drop(paths);
            tracing::debug!(path = %path.display(), "Registered after teardown, removing");
            self.discard(&path);
            return false;
        }
        tracing::trace!(path = %path.display(), "Registered for teardown");
        paths.push(path);
        true
    }

    /// Remove `path` now, without recording it.
    pub fn discard(&self, path: &Path) {
        if let Err(e) = remove_path(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary path");
        }
    }

    /// Snapshot of every registered path, in registration order.
    pub fn registered(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether teardown already ran.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Remove every registered path. Returns how many were removed; later calls are no-ops.
    pub fn run(&self) -> usize {
        if self.done.swap(true, Ordering::SeqCst) {
            return 0;
        }

        let paths = std::mem::take(&mut *self.paths.lock().unwrap_or_else(PoisonError::into_inner));
        let mut removed = 0;
        for path in paths.iter().rev() {
            match remove_path(path) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary path")
                }
            }
        }

        tracing::debug!(removed, "Teardown complete");
        removed
    }
}

fn remove_path(path: &Path) -> std::io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_removes_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("nested")).unwrap();
        let file = root.join("nested/file.txt");
        fs::write(&file, b"payload").unwrap();

        let teardown = Teardown::new();
        teardown.register(&root);
        teardown.register(&file);

        assert_eq!(teardown.run(), 2);
        assert!(!root.exists());
        assert!(teardown.is_done());
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("once.txt");
        fs::write(&file, b"x").unwrap();

        let teardown = Teardown::new();
        teardown.register(&file);
        assert_eq!(teardown.run(), 1);

        fs::write(&file, b"x").unwrap();
        assert_eq!(teardown.run(), 0);
        assert!(file.exists());
    }

    #[test]
    fn test_register_after_run_removes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let late_dir = dir.path().join("late");
        fs::create_dir_all(late_dir.join("inner")).unwrap();
        let late_file = dir.path().join("late.txt");
        fs::write(&late_file, b"x").unwrap();

        let teardown = Teardown::new();
        assert!(teardown.register(dir.path().join("early")));
        teardown.run();

        assert!(!teardown.register(&late_dir));
        assert!(!teardown.register(&late_file));
        assert!(!late_dir.exists());
        assert!(!late_file.exists());
        assert!(teardown.registered().is_empty());
    }

    #[test]
    fn test_missing_paths_are_ignored() {
        let teardown = Teardown::new();
        teardown.register("/nonexistent/warboot/teardown/path");
        assert_eq!(teardown.run(), 0);
    }
}
