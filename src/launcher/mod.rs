//! Bootstrap launcher.
//!
//! # Data Flow
//! ```text
//! argv
//!     → mode.rs (LaunchMode, parsed before any side effect)
//!     → Archive::open, Workspace::create
//!     → Server: payload extraction → webroot → config resolution + props
//!               → mainclass → ExecutionContext → invoke(args)
//!       Script: full walk → ScriptBridge (locate, run)
//!     → report failure (stderr, remediation hints on stdout)
//!     → Teardown::run
//!     → exit code
//! ```

pub mod mode;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::Archive;
use crate::config::{LauncherSettings, ProcessEnvironment, Resolver};
use crate::context::{EntryPointRegistry, ExecutionContext};
use crate::error::LaunchError;
use crate::extract::Extractor;
use crate::lifecycle::{ChildSupervisor, Teardown, Workspace};
use crate::script::{JRubyRuntime, ScriptBridge, ScriptRuntime};

pub use mode::{collect_args, LaunchMode, ScriptRequest};

/// Runs one launch of an archive.
pub struct Launcher {
    settings: LauncherSettings,
    teardown: Arc<Teardown>,
    supervisor: Arc<ChildSupervisor>,
    registry: Arc<EntryPointRegistry>,
    script_runtime: Option<Arc<dyn ScriptRuntime>>,
    workspace_parent: Option<PathBuf>,
}

impl Launcher {
    pub fn new(settings: LauncherSettings) -> Self {
        Self {
            settings,
            teardown: Arc::new(Teardown::new()),
            supervisor: Arc::new(ChildSupervisor::new()),
            registry: Arc::new(EntryPointRegistry::new()),
            script_runtime: None,
            workspace_parent: None,
        }
    }

    /// Host entry points consulted after the loaded units.
    pub fn with_registry(mut self, registry: Arc<EntryPointRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Use `runtime` instead of discovering JRuby in the extracted archive.
    pub fn with_script_runtime(mut self, runtime: Arc<dyn ScriptRuntime>) -> Self {
        self.script_runtime = Some(runtime);
        self
    }

    /// Create workspaces under `parent` instead of the system temp directory.
    pub fn with_workspace_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.workspace_parent = Some(parent.into());
        self
    }

    pub fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    /// Teardown shared with the signal handler.
    pub fn teardown(&self) -> Arc<Teardown> {
        self.teardown.clone()
    }

    /// Owner of the script runtime process, shared with the signal handler.
    pub fn supervisor(&self) -> Arc<ChildSupervisor> {
        self.supervisor.clone()
    }

    /// Launch, report any failure and clean up. Returns the process exit code.
    pub fn start(&self, archive: &Path, args: &[String]) -> i32 {
        let code = match self.launch(archive, args) {
            Ok(code) => code,
            Err(err) => {
                self.report(&err);
                err.exit_code()
            }
        };

        let removed = self.teardown.run();
        tracing::debug!(code, removed, "Launch finished");
        code
    }

    /// Launch without reporting or cleanup.
    pub fn launch(&self, archive: &Path, args: &[String]) -> Result<i32, LaunchError> {
        let mode = LaunchMode::parse(args)?;
        let mut archive = Archive::open(archive)?;
        let workspace = self.create_workspace(&archive.file_name())?;

        match mode {
            LaunchMode::Server => self.run_server(&mut archive, &workspace, args),
            LaunchMode::Script(request) => self.run_script(&mut archive, &workspace, &request),
        }
    }

    fn create_workspace(&self, archive_name: &str) -> Result<Workspace, LaunchError> {
        match &self.workspace_parent {
            Some(parent) => Workspace::create_in(parent, archive_name, self.teardown.clone()),
            None => Workspace::create(archive_name, self.teardown.clone()),
        }
    }

    fn run_server(
        &self,
        archive: &mut Archive,
        workspace: &Workspace,
        args: &[String],
    ) -> Result<i32, LaunchError> {
        let payload = Extractor::new(workspace).extract_server_payload(archive)?;
        let webroot = workspace.prepare_webroot()?;

        if !matches!(self.settings.port().parse::<u16>(), Ok(port) if port != 0) {
            tracing::warn!(
                port = self.settings.port(),
                "Port is not a valid port number, substituting it as is"
            );
        }
        let config = Resolver::new(&self.settings).resolve(archive, webroot);
        let applied = config.apply_props(&mut ProcessEnvironment)?;
        let entry = config.entry_point()?;

        let context = ExecutionContext::build(&payload.units(), self.registry.clone())?;
        let entry_point = context.resolve(entry)?;
        let argv = config.invocation_args(args);

        tracing::info!(entry, props = applied, "Starting webserver");
        tracing::debug!(?argv, webroot = %webroot.display(), "Webserver arguments");
        entry_point.invoke(&argv)
    }

    fn run_script(
        &self,
        archive: &mut Archive,
        workspace: &Workspace,
        request: &ScriptRequest,
    ) -> Result<i32, LaunchError> {
        if let Some(advisory) = request.advisory() {
            tracing::warn!("{advisory}");
        }

        let classpath = Extractor::new(workspace).extract_all(archive)?;
        let runtime: Arc<dyn ScriptRuntime> = match &self.script_runtime {
            Some(runtime) => runtime.clone(),
            None => Arc::new(JRubyRuntime::discover(workspace.root(), &self.settings.runtime)),
        };

        tracing::info!(
            executable = %request.executable,
            runtime = runtime.name(),
            "Running packaged executable"
        );
        ScriptBridge::new(
            runtime.as_ref(),
            workspace,
            &self.supervisor,
            self.settings.runtime.bundler_setup,
        )
        .run(request, &classpath)
    }

    fn report(&self, err: &LaunchError) {
        eprintln!("ERROR: {err}");
        if self.settings.observability.debug {
            let mut source = std::error::Error::source(err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }
        if let Some(hints) = err.remediation() {
            for hint in hints {
                println!("{hint}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_error_precedes_archive_access() {
        let parent = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(LauncherSettings::default()).with_workspace_parent(parent.path());

        let err = launcher
            .launch(Path::new("/nonexistent/app.war"), &["-S".to_string()])
            .unwrap_err();
        assert!(matches!(err, LaunchError::Argument(_)));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_archive_is_reported() {
        let parent = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(LauncherSettings::default()).with_workspace_parent(parent.path());

        assert_eq!(launcher.start(Path::new("/nonexistent/app.war"), &[]), 1);
        assert!(launcher.teardown().is_done());
    }
}
