//! Executable location.
//!
//! ```text
//! start ──exists under root──▶ DirectHit ──────────────▶ done
//!   │
//!   └──otherwise──▶ LookupPending ──runtime found it──▶ LookupSucceeded ──▶ done
//!                         │
//!                         └──not found──▶ LookupFailed ──▶ ExecutableNotFound
//! ```

use std::path::{Component, Path, PathBuf};

use crate::error::LaunchError;
use crate::script::{LookupRequest, ScriptRuntime};

/// Where the location of an executable stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The executable is a file relative to the extraction root.
    DirectHit(PathBuf),
    /// Not a file; the runtime's package metadata must be asked.
    LookupPending,
    /// The runtime reported the executable's path.
    LookupSucceeded(PathBuf),
    /// Neither check found it.
    LookupFailed,
}

impl Location {
    /// Initial state from the direct file check.
    pub fn start(root: &Path, executable: &str) -> Self {
        let candidate = root_relative(root, executable);
        if candidate.is_file() {
            Location::DirectHit(candidate)
        } else {
            Location::LookupPending
        }
    }

    /// Resolved path, for terminal success states.
    pub fn resolved(&self) -> Option<&Path> {
        match self {
            Location::DirectHit(path) | Location::LookupSucceeded(path) => Some(path),
            Location::LookupPending | Location::LookupFailed => None,
        }
    }
}

/// `executable` taken relative to `root`, even when written as an absolute path.
fn root_relative(root: &Path, executable: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in Path::new(executable).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => path.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    path
}

/// Run the location state machine to completion.
pub fn locate_executable(
    runtime: &dyn ScriptRuntime,
    request: &LookupRequest<'_>,
) -> Result<PathBuf, LaunchError> {
    let mut state = Location::start(request.root, request.executable);
    loop {
        tracing::trace!(executable = request.executable, ?state, "Locating executable");
        state = match state {
            Location::DirectHit(path) | Location::LookupSucceeded(path) => return Ok(path),
            Location::LookupPending => match runtime.lookup_executable(request)? {
                Some(path) => Location::LookupSucceeded(path),
                None => Location::LookupFailed,
            },
            Location::LookupFailed => {
                return Err(LaunchError::ExecutableNotFound(
                    request.executable.to_string(),
                ))
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_direct_hit() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("META-INF")).unwrap();
        fs::write(root.path().join("META-INF/rails.rb"), "puts 1").unwrap();

        let state = Location::start(root.path(), "./META-INF/rails.rb");
        assert_eq!(
            state.resolved(),
            Some(root.path().join("META-INF/rails.rb").as_path())
        );
    }

    #[test]
    fn test_absolute_name_stays_under_root() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("bin")).unwrap();
        fs::write(root.path().join("bin/tool"), "").unwrap();

        assert!(matches!(
            Location::start(root.path(), "/bin/tool"),
            Location::DirectHit(_)
        ));
    }

    #[test]
    fn test_missing_file_is_pending() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(Location::start(root.path(), "rake"), Location::LookupPending);
        assert_eq!(Location::LookupPending.resolved(), None);
    }

    #[test]
    fn test_directory_is_not_a_hit() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("rake")).unwrap();
        assert_eq!(Location::start(root.path(), "rake"), Location::LookupPending);
    }
}
