//! Resource extraction subsystem.
//!
//! # Data Flow
//! ```text
//! Archive entry
//!     → remap.rs (entry path → destination relative to the workspace root)
//!     → written to disk, registered with Teardown
//!     → Extraction::Loadable | Extraction::File | Extraction::Directory
//!
//! Server payloads (webserver.so, logger.so):
//!     → looked up by exact name
//!     → streamed into fresh temp files, registered with Teardown
//! ```
//!
//! # Design Decisions
//! - Every entry is written, loadable or not; launched programs read their payload as files
//! - Re-extracting the same archive overwrites destinations byte for byte
//! - Entries whose names escape the root are skipped

pub mod remap;

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::archive::layout::{LOGGER_LIBRARY, WEBSERVER_LIBRARY};
use crate::archive::Archive;
use crate::error::LaunchError;
use crate::lifecycle::Workspace;

pub use remap::{is_loadable, remap_entry_path};

/// An entry written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedResource {
    /// Entry path inside the archive.
    pub entry: String,
    /// Where it was written.
    pub destination: PathBuf,
}

/// Outcome of extracting one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A file eligible for the execution context / runtime classpath.
    Loadable(ExtractedResource),
    /// A plain file the launched program may read.
    File(ExtractedResource),
    /// A directory marker.
    Directory(ExtractedResource),
}

impl Extraction {
    pub fn resource(&self) -> &ExtractedResource {
        match self {
            Extraction::Loadable(r) | Extraction::File(r) | Extraction::Directory(r) => r,
        }
    }
}

/// The two libraries the server mode needs, in load order.
#[derive(Debug, Clone)]
pub struct ServerPayload {
    pub webserver: PathBuf,
    pub logger: PathBuf,
}

impl ServerPayload {
    /// Loadable units for the execution context.
    pub fn units(&self) -> Vec<PathBuf> {
        vec![self.webserver.clone(), self.logger.clone()]
    }
}

/// Copies archive entries into a [`Workspace`].
pub struct Extractor<'w> {
    workspace: &'w Workspace,
}

impl<'w> Extractor<'w> {
    pub fn new(workspace: &'w Workspace) -> Self {
        Self { workspace }
    }

    /// Extraction root.
    pub fn root(&self) -> &Path {
        self.workspace.root()
    }

    /// Filesystem destination for an entry name.
    pub fn destination_for(&self, name: &str) -> PathBuf {
        let remapped = remap_entry_path(name);
        self.root().join(remapped.trim_start_matches('/'))
    }

    /// Write a single entry to its remapped destination.
    pub fn extract_entry(
        &self,
        name: &str,
        is_dir: bool,
        reader: &mut dyn Read,
    ) -> Result<Extraction, LaunchError> {
        let remapped = remap_entry_path(name);
        let destination = self.root().join(remapped.trim_start_matches('/'));
        let resource = ExtractedResource {
            entry: name.to_string(),
            destination: destination.clone(),
        };

        if is_dir {
            fs::create_dir_all(&destination).map_err(|e| {
                LaunchError::io(format!("cannot create {}", destination.display()), e)
            })?;
            if destination != self.root() {
                self.workspace.track(&destination)?;
            }
            return Ok(Extraction::Directory(resource));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| LaunchError::io(format!("cannot create {}", parent.display()), e))?;
        }
        let mut file = File::create(&destination)
            .map_err(|e| LaunchError::io(format!("cannot create {}", destination.display()), e))?;
        self.workspace.track(&destination)?;
        io::copy(reader, &mut file)
            .map_err(|e| LaunchError::io(format!("failed to extract {name}"), e))?;

        if is_loadable(&remapped) {
            Ok(Extraction::Loadable(resource))
        } else {
            Ok(Extraction::File(resource))
        }
    }

    /// Walk the whole archive, writing every entry. Returns the loadable units in archive order.
    pub fn extract_all(&self, archive: &mut Archive) -> Result<Vec<PathBuf>, LaunchError> {
        let mut loadable = Vec::new();
        let mut written = 0usize;

        archive.visit(|entry| {
            if entry.is_unsafe {
                tracing::warn!(entry = entry.name, "Skipping archive entry outside the extraction root");
                return Ok(());
            }
            match self.extract_entry(entry.name, entry.is_dir, entry.reader)? {
                Extraction::Loadable(resource) => {
                    tracing::trace!(entry = %resource.entry, "Loadable unit extracted");
                    loadable.push(resource.destination);
                    written += 1;
                }
                Extraction::File(_) => written += 1,
                Extraction::Directory(_) => {}
            }
            Ok(())
        })?;

        tracing::debug!(
            root = %self.root().display(),
            files = written,
            loadable = loadable.len(),
            "Archive extracted"
        );
        Ok(loadable)
    }

    /// Stream one named entry into a fresh temp file in the workspace.
    ///
    /// Fails with [`LaunchError::MissingPayload`] if the entry does not exist.
    pub fn extract_payload(
        &self,
        archive: &mut Archive,
        entry: &str,
        prefix: &str,
    ) -> Result<PathBuf, LaunchError> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(std::env::consts::DLL_SUFFIX)
            .tempfile_in(self.root())
            .map_err(|e| LaunchError::io(format!("cannot create temp file for {entry}"), e))?;

        let copied = archive.with_entry(entry, |reader| io::copy(reader, file.as_file_mut()))?;
        let Some(bytes) = copied else {
            return Err(LaunchError::MissingPayload {
                entry: entry.to_string(),
            });
        };

        let (_, path) = file
            .keep()
            .map_err(|e| LaunchError::io(format!("cannot keep temp file for {entry}"), e.error))?;
        self.workspace.track(&path)?;

        tracing::debug!(entry, path = %path.display(), bytes, "Payload extracted");
        Ok(path)
    }

    /// Extract the webserver and logger libraries.
    pub fn extract_server_payload(&self, archive: &mut Archive) -> Result<ServerPayload, LaunchError> {
        let webserver = self.extract_payload(archive, WEBSERVER_LIBRARY, "webserver")?;
        let logger = self.extract_payload(archive, LOGGER_LIBRARY, "logger")?;
        Ok(ServerPayload { webserver, logger })
    }
}
