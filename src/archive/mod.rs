//! Read access to the enclosing archive.
//!
//! # Responsibilities
//! - Open the zip payload (a plain archive or one appended to the launcher binary)
//! - Walk every entry in order
//! - Look up single entries by exact name
//!
//! # Design Decisions
//! - Entry readers are only handed out inside closures; callers never name zip types
//! - A missing entry is `Ok(None)`, every other failure is an error

pub mod layout;

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::LaunchError;

/// An opened archive and the absolute path it was read from.
pub struct Archive {
    path: PathBuf,
    inner: ZipArchive<File>,
}

/// A single entry handed to [`Archive::visit`].
pub struct ArchiveEntry<'a> {
    /// Entry path as stored in the archive (forward slashes, no leading slash).
    pub name: &'a str,
    /// Whether the entry is a directory marker.
    pub is_dir: bool,
    /// Whether the entry name escapes its root (`..`, absolute paths).
    pub is_unsafe: bool,
    /// Entry contents.
    pub reader: &'a mut dyn Read,
}

impl Archive {
    /// Open the archive at `path`.
    pub fn open(path: &Path) -> Result<Self, LaunchError> {
        let path = fs::canonicalize(path)
            .map_err(|e| LaunchError::io(format!("cannot open archive {}", path.display()), e))?;
        let file = File::open(&path)
            .map_err(|e| LaunchError::io(format!("cannot open archive {}", path.display()), e))?;
        let inner = ZipArchive::new(file).map_err(|source| LaunchError::Archive {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(archive = %path.display(), entries = inner.len(), "Archive opened");

        Ok(Self { path, inner })
    }

    /// Absolute path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the archive, used to name the webroot directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Visit every entry in archive order.
    pub fn visit<F>(&mut self, mut visitor: F) -> Result<(), LaunchError>
    where
        F: FnMut(ArchiveEntry<'_>) -> Result<(), LaunchError>,
    {
        for index in 0..self.inner.len() {
            let mut file = self.inner.by_index(index).map_err(|source| LaunchError::Archive {
                path: self.path.clone(),
                source,
            })?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let is_unsafe = file.enclosed_name().is_none();
            visitor(ArchiveEntry {
                name: &name,
                is_dir,
                is_unsafe,
                reader: &mut file,
            })?;
        }
        Ok(())
    }

    /// Run `read` against the entry called `name`, or return `Ok(None)` if it does not exist.
    pub fn with_entry<T, F>(&mut self, name: &str, read: F) -> Result<Option<T>, LaunchError>
    where
        F: FnOnce(&mut dyn Read) -> std::io::Result<T>,
    {
        let mut file = match self.inner.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(source) => {
                return Err(LaunchError::Archive {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        read(&mut file)
            .map(Some)
            .map_err(|e| LaunchError::io(format!("failed to read archive entry {name}"), e))
    }

    /// Read an entry as UTF-8 text.
    pub fn read_to_string(&mut self, name: &str) -> Result<Option<String>, LaunchError> {
        self.with_entry(name, |reader| {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            Ok(text)
        })
    }
}
