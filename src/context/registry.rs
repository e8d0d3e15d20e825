//! Entry points linked into the host process.
//!
//! The registry is the ambient context every execution context falls back
//! to: a name looked up here is found only if no loaded unit exports it.

use std::collections::HashMap;
use std::fmt;

/// Entry function compiled into the host binary.
pub type HostEntryFn = fn(&[String]) -> i32;

/// Errors that can occur in registry operations
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Entry point {0} already registered")]
    AlreadyExists(String),
}

/// Name → entry function map.
#[derive(Default, Clone)]
pub struct EntryPointRegistry {
    entries: HashMap<String, HostEntryFn>,
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under `name`.
    pub fn register(&mut self, name: impl Into<String>, entry: HostEntryFn) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::AlreadyExists(name));
        }
        tracing::debug!(entry_point = %name, "Registered host entry point");
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<HostEntryFn> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EntryPointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("EntryPointRegistry").field("entries", &names).finish()
    }
}
