//! Execution context for the embedded server.
//!
//! # Data Flow
//! ```text
//! ServerPayload units (webserver.so, logger.so)
//!     → ExecutionContext::build (libraries opened in order)
//!     → resolve(mainclass)
//!         unit 1 → unit 2 → … → EntryPointRegistry (host fallback)
//!     → EntryPoint::invoke(argv) → exit code
//! ```
//!
//! # Entry ABI
//! Native units export the configured symbol as
//! `extern "C" fn(argc: c_int, argv: *const *const c_char) -> c_int`.
//! `argv` holds exactly the invocation arguments, without a program name,
//! and is followed by a null pointer.

pub mod registry;

use std::ffi::{c_char, c_int, CString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::error::LaunchError;

pub use registry::{EntryPointRegistry, HostEntryFn, RegistryError};

/// Signature of a native entry point.
pub type NativeEntryFn = unsafe extern "C" fn(argc: c_int, argv: *const *const c_char) -> c_int;

struct LoadedUnit {
    path: PathBuf,
    library: Library,
}

/// Loaded units scoped to one launch, chained to the host registry.
pub struct ExecutionContext {
    units: Vec<LoadedUnit>,
    ambient: Arc<EntryPointRegistry>,
}

impl ExecutionContext {
    /// Open every unit in order.
    pub fn build(units: &[PathBuf], ambient: Arc<EntryPointRegistry>) -> Result<Self, LaunchError> {
        let mut loaded = Vec::with_capacity(units.len());
        for path in units {
            // SAFETY: the units come from the launcher's own archive. Their
            // initializers run on the launch thread; the only other thread is
            // the Tokio signal listener, which neither loads libraries nor
            // reads the environment.
            let library = unsafe { Library::new(path) }.map_err(|source| LaunchError::LoadUnit {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(unit = %path.display(), "Loaded unit");
            loaded.push(LoadedUnit {
                path: path.clone(),
                library,
            });
        }
        Ok(Self {
            units: loaded,
            ambient,
        })
    }

    /// Paths of the loaded units, in lookup order.
    pub fn unit_paths(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().map(|unit| unit.path.as_path())
    }

    /// Find `name` in the loaded units, then in the host registry.
    pub fn resolve(&self, name: &str) -> Result<EntryPoint<'_>, LaunchError> {
        if name.contains('\0') {
            return Err(LaunchError::SymbolResolution {
                symbol: name.to_string(),
                reason: "name contains a NUL byte".to_string(),
            });
        }

        for unit in &self.units {
            // SAFETY: the symbol is only called through the documented entry ABI.
            match unsafe { unit.library.get::<NativeEntryFn>(name.as_bytes()) } {
                Ok(symbol) => {
                    tracing::debug!(entry_point = name, unit = %unit.path.display(), "Resolved entry point");
                    return Ok(EntryPoint::Native {
                        name: name.to_string(),
                        symbol,
                    });
                }
                Err(e) => {
                    tracing::trace!(entry_point = name, unit = %unit.path.display(), error = %e, "Symbol not in unit")
                }
            }
        }

        if let Some(func) = self.ambient.lookup(name) {
            tracing::debug!(entry_point = name, "Resolved entry point from host registry");
            return Ok(EntryPoint::Host {
                name: name.to_string(),
                func,
            });
        }

        Err(LaunchError::SymbolResolution {
            symbol: name.to_string(),
            reason: format!(
                "not exported by {} loaded unit(s) or registered in the host",
                self.units.len()
            ),
        })
    }
}

/// A resolved entry point.
pub enum EntryPoint<'ctx> {
    Native {
        name: String,
        symbol: Symbol<'ctx, NativeEntryFn>,
    },
    Host {
        name: String,
        func: HostEntryFn,
    },
}

impl EntryPoint<'_> {
    pub fn name(&self) -> &str {
        match self {
            EntryPoint::Native { name, .. } | EntryPoint::Host { name, .. } => name,
        }
    }

    /// Call the entry point synchronously with `args`.
    pub fn invoke(&self, args: &[String]) -> Result<i32, LaunchError> {
        match self {
            EntryPoint::Host { func, .. } => Ok(func(args)),
            EntryPoint::Native { symbol, .. } => {
                let owned = args
                    .iter()
                    .map(|arg| {
                        CString::new(arg.as_str()).map_err(|_| {
                            LaunchError::InvalidInvocation(format!("argument {arg:?} contains a NUL byte"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut argv: Vec<*const c_char> = owned.iter().map(|arg| arg.as_ptr()).collect();
                argv.push(std::ptr::null());
                let argc = c_int::try_from(owned.len()).map_err(|_| {
                    LaunchError::InvalidInvocation("too many arguments".to_string())
                })?;

                // SAFETY: `argv` and the strings it points to outlive the call.
                let code = unsafe { (**symbol)(argc, argv.as_ptr()) };
                Ok(code)
            }
        }
    }
}
