//! Launch failure taxonomy.

use std::path::PathBuf;

use thiserror::Error;

use crate::archive::layout::WEBSERVER_LIBRARY;

/// Errors that can end a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Malformed `-S` usage.
    #[error("{0}")]
    Argument(String),

    /// A named payload resource is absent from the archive.
    #[error("archive entry not found: {entry}")]
    MissingPayload { entry: String },

    /// The configuration resource does not name an entry point.
    #[error("unknown webserver entry point (WEB-INF/webserver.properties is missing 'mainclass' property)")]
    MissingEntryPoint,

    /// The named entry point could not be resolved in the execution context.
    #[error("failed to resolve entry point '{symbol}': {reason}")]
    SymbolResolution { symbol: String, reason: String },

    /// Script mode could not find the requested executable.
    #[error("failed to locate gem executable: '{0}'")]
    ExecutableNotFound(String),

    /// The script runtime failed while running the executable.
    #[error("script execution failed: {message}")]
    ScriptExecution { message: String, status: Option<i32> },

    /// A loadable unit could not be opened.
    #[error("failed to load {}: {source}", .path.display())]
    LoadUnit {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The archive itself could not be read.
    #[error("failed to read archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem failure while extracting or preparing the workspace.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A termination signal stopped the launch or its child process.
    #[error("launch interrupted by shutdown")]
    Interrupted,

    /// A value cannot be handed to the launched program as-is.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
}

impl LaunchError {
    /// Wraps an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ScriptExecution {
                status: Some(status),
                ..
            } => *status,
            _ => 1,
        }
    }

    /// Hint lines printed after the error message for expected packaging mistakes.
    pub fn remediation(&self) -> Option<&'static [&'static str]> {
        const RUN_EXECUTABLE: &[&str] = &[
            "specify the -S argument followed by the bin file to run e.g. `warboot -S rake -T` ...",
            "(or if you'd like your archive to start a web server package it with an embedded webserver)",
        ];
        match self {
            Self::MissingPayload { entry } if entry == WEBSERVER_LIBRARY => Some(RUN_EXECUTABLE),
            Self::MissingEntryPoint => Some(RUN_EXECUTABLE),
            _ => None,
        }
    }
}
