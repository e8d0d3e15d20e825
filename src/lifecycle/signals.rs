//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl-C) and SIGTERM for the whole launch
//! - Report which one arrived and its conventional exit code
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are installed once, so a signal ignored while a script runs is not lost to a later one
//! - Teardown and child handling are the caller's job; this module only observes signals

use std::io;

/// Exit code after SIGINT.
pub const SIGINT_EXIT_CODE: i32 = 130;

/// Exit code after SIGTERM.
pub const SIGTERM_EXIT_CODE: i32 = 143;

/// A termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl Termination {
    pub fn exit_code(self) -> i32 {
        match self {
            Termination::Interrupt => SIGINT_EXIT_CODE,
            Termination::Terminate => SIGTERM_EXIT_CODE,
        }
    }
}

/// Installed termination handlers.
#[cfg(unix)]
pub struct TerminationSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    /// Install the handlers. Must be called inside a Tokio runtime.
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next termination request.
    pub async fn recv(&mut self) -> Termination {
        let received = tokio::select! {
            _ = self.interrupt.recv() => Termination::Interrupt,
            _ = self.terminate.recv() => Termination::Terminate,
        };
        tracing::info!(signal = ?received, "Termination signal received");
        received
    }
}

/// Installed termination handlers.
#[cfg(not(unix))]
pub struct TerminationSignals {
    _private: (),
}

#[cfg(not(unix))]
impl TerminationSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self { _private: () })
    }

    pub async fn recv(&mut self) -> Termination {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received");
                Termination::Interrupt
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<Termination>().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Termination::Interrupt.exit_code(), 130);
        assert_eq!(Termination::Terminate.exit_code(), 143);
    }
}
