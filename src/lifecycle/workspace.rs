//! Per-invocation temporary workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LaunchError;
use crate::lifecycle::Teardown;

/// Temporary directory tree owned by one launch.
///
/// The root is registered with the [`Teardown`] as soon as it exists, so every
/// later return path removes it.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    webroot: PathBuf,
    teardown: Arc<Teardown>,
}

impl Workspace {
    /// Create a fresh root under the system temp directory.
    ///
    /// `archive_name` names the webroot subdirectory.
    pub fn create(archive_name: &str, teardown: Arc<Teardown>) -> Result<Self, LaunchError> {
        Self::create_in(&std::env::temp_dir(), archive_name, teardown)
    }

    /// Create a fresh root under `parent`.
    pub fn create_in(
        parent: &Path,
        archive_name: &str,
        teardown: Arc<Teardown>,
    ) -> Result<Self, LaunchError> {
        let root = tempfile::Builder::new()
            .prefix("warbler")
            .suffix("webroot")
            .tempdir_in(parent)
            .map_err(|e| LaunchError::io("cannot create temporary workspace", e))?
            .keep();
        if !teardown.register(&root) {
            return Err(LaunchError::Interrupted);
        }

        let webroot = root.join(archive_name);
        tracing::debug!(root = %root.display(), webroot = %webroot.display(), "Workspace created");

        Ok(Self {
            root,
            webroot,
            teardown,
        })
    }

    /// Workspace root; also the extraction root in script mode.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Webroot path, substituted for `{{webroot}}`.
    pub fn webroot(&self) -> &Path {
        &self.webroot
    }

    /// Create the webroot directory on disk.
    pub fn prepare_webroot(&self) -> Result<&Path, LaunchError> {
        fs::create_dir_all(&self.webroot).map_err(|e| {
            LaunchError::io(
                format!("cannot create webroot {}", self.webroot.display()),
                e,
            )
        })?;
        self.track(&self.webroot)?;
        Ok(&self.webroot)
    }

    /// Record a path created inside (or for) this workspace.
    ///
    /// Fails with [`LaunchError::Interrupted`] once teardown has run; the path and
    /// anything recreated under the root are removed again.
    pub fn track(&self, path: &Path) -> Result<(), LaunchError> {
        if self.teardown.register(path) {
            return Ok(());
        }
        self.teardown.discard(&self.root);
        Err(LaunchError::Interrupted)
    }

    /// Teardown shared with the rest of the launch.
    pub fn teardown(&self) -> &Arc<Teardown> {
        &self.teardown
    }
}
