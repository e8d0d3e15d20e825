//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Workspace (workspace.rs):
//!     temp root created → every extracted path registered with Teardown
//!
//! Teardown (shutdown.rs):
//!     launch returns or fails → registered paths removed, once
//!
//! Supervisor (supervisor.rs):
//!     script runtime child spawned and waited on → reachable from the signal path
//!
//! Signals (signals.rs):
//!     SIGINT with a running child → left to the child
//!     SIGTERM with a running child → child killed, launch finishes, exit 143
//!     otherwise → Teardown → exit with 130/143
//! ```
//!
//! # Design Decisions
//! - Teardown is idempotent: the launcher and the signal path may both run it
//! - Paths are removed in reverse registration order, the workspace root last
//! - A path registered after teardown is removed on the spot and stops the launch

pub mod shutdown;
pub mod signals;
pub mod supervisor;
pub mod workspace;

pub use shutdown::Teardown;
pub use signals::{Termination, TerminationSignals};
pub use supervisor::ChildSupervisor;
pub use workspace::Workspace;
