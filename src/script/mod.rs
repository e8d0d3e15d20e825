//! Script runtime bridge.
//!
//! # Data Flow
//! ```text
//! ScriptRequest (executable, arguments, executable_argv)
//!     → prelude.rs (GEM_HOME / BUNDLE_GEMFILE / init script, rendered by the runtime)
//!     → locate.rs  (DirectHit | LookupPending → LookupSucceeded | LookupFailed)
//!     → prelude written into the workspace
//!     → ScriptRuntime::run (child process, cwd = extraction root)
//!     → exit code
//! ```
//!
//! # Design Decisions
//! - Everything runtime specific sits behind [`ScriptRuntime`]
//! - The runtime runs in a child process, so the launcher's environment is never touched
//! - Existing environment values win over the prelude's defaults

pub mod jruby;
pub mod locate;
pub mod prelude;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::LaunchError;
use crate::launcher::mode::ScriptRequest;
use crate::lifecycle::{ChildSupervisor, Workspace};

pub use jruby::JRubyRuntime;
pub use locate::{locate_executable, Location};
pub use prelude::EnvPrelude;

/// Inputs to a runtime-side executable lookup.
#[derive(Debug, Clone)]
pub struct LookupRequest<'a> {
    pub root: &'a Path,
    pub executable: &'a str,
    /// Rendered environment prelude.
    pub prelude: &'a str,
    /// Activate the packaged Gemfile before searching.
    pub bundler_setup: bool,
    pub classpath: &'a [PathBuf],
    /// Owner of any process the lookup starts.
    pub supervisor: &'a ChildSupervisor,
}

/// A fully located script ready to run.
#[derive(Debug, Clone)]
pub struct ScriptInvocation<'a> {
    /// Working directory.
    pub root: &'a Path,
    pub script: &'a Path,
    /// File holding the rendered prelude.
    pub prelude_file: &'a Path,
    /// Runtime options, parsed before the script runs.
    pub arguments: &'a [String],
    /// The script's own argv.
    pub argv: &'a [String],
    pub classpath: &'a [PathBuf],
    /// Owner of the script process.
    pub supervisor: &'a ChildSupervisor,
}

/// An interpreter able to find and run packaged executables.
pub trait ScriptRuntime: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Source text that sets up the environment before a script runs.
    fn render_prelude(&self, prelude: &EnvPrelude) -> String;

    /// Ask the runtime's package metadata for an executable.
    ///
    /// `Ok(None)` means "not found"; errors are reserved for runtime failures.
    fn lookup_executable(&self, request: &LookupRequest<'_>) -> Result<Option<PathBuf>, LaunchError>;

    /// Run a script to completion and return its exit code.
    fn run(&self, invocation: &ScriptInvocation<'_>) -> Result<i32, LaunchError>;
}

/// Drives one script-mode launch against an extracted workspace.
pub struct ScriptBridge<'a> {
    runtime: &'a dyn ScriptRuntime,
    workspace: &'a Workspace,
    supervisor: &'a ChildSupervisor,
    bundler_setup: bool,
}

impl<'a> ScriptBridge<'a> {
    pub fn new(
        runtime: &'a dyn ScriptRuntime,
        workspace: &'a Workspace,
        supervisor: &'a ChildSupervisor,
        bundler_setup: bool,
    ) -> Self {
        Self {
            runtime,
            workspace,
            supervisor,
            bundler_setup,
        }
    }

    /// Locate `request.executable` and run it. `classpath` holds the loadable units of the walk.
    pub fn run(&self, request: &ScriptRequest, classpath: &[PathBuf]) -> Result<i32, LaunchError> {
        let root = self.workspace.root();
        let prelude = self.runtime.render_prelude(&EnvPrelude::for_root(root));

        let lookup = LookupRequest {
            root,
            executable: &request.executable,
            prelude: &prelude,
            bundler_setup: self.bundler_setup,
            classpath,
            supervisor: self.supervisor,
        };
        let script = locate_executable(self.runtime, &lookup)?;
        tracing::debug!(
            runtime = self.runtime.name(),
            script = %script.display(),
            "Executable located"
        );

        let prelude_file = self.write_prelude(&prelude)?;
        let invocation = ScriptInvocation {
            root,
            script: &script,
            prelude_file: &prelude_file,
            arguments: &request.arguments,
            argv: &request.executable_argv,
            classpath,
            supervisor: self.supervisor,
        };
        let code = self.runtime.run(&invocation)?;
        tracing::debug!(executable = %request.executable, code, "Script finished");
        Ok(code)
    }

    fn write_prelude(&self, source: &str) -> Result<PathBuf, LaunchError> {
        let mut file = tempfile::Builder::new()
            .prefix("warboot-prelude")
            .suffix(".rb")
            .tempfile_in(self.workspace.root())
            .map_err(|e| LaunchError::io("cannot create prelude file", e))?;
        file.write_all(source.as_bytes())
            .map_err(|e| LaunchError::io("cannot write prelude file", e))?;

        let (_, path) = file
            .keep()
            .map_err(|e| LaunchError::io("cannot keep prelude file", e.error))?;
        self.workspace.track(&path)?;
        Ok(path)
    }
}
