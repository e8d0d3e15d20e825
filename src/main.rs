//! warboot
//!
//! Self-extracting launcher for web application archives.
//!
//! # Architecture Overview
//!
//! ```text
//!     argv ──▶ launcher::mode ──┬── Server ──▶ extract (webserver.so, logger.so)
//!                               │                 │
//!                               │                 ▼
//!                               │             config::resolver ──▶ props → environment
//!                               │                 │
//!                               │                 ▼
//!                               │             context (units → host registry) ──▶ invoke
//!                               │
//!                               └── Script ──▶ extract (full walk)
//!                                                 │
//!                                                 ▼
//!                                             script (prelude → locate → run)
//!
//!     lifecycle: Workspace + Teardown, run on return and on SIGINT/SIGTERM;
//!                a running script child is killed on SIGTERM and keeps SIGINT
//! ```

use std::path::PathBuf;

use warboot::config::settings_from_process_env;
use warboot::launcher::collect_args;
use warboot::lifecycle::{Termination, TerminationSignals};
use warboot::observability::logging;
use warboot::Launcher;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let settings = match settings_from_process_env() {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };
    logging::init(&settings.observability);

    let archive = match archive_path(&settings) {
        Ok(path) => path,
        Err(e) => fail(format!("cannot locate the launcher archive: {e}")),
    };
    let args = match collect_args(std::env::args_os().skip(1)) {
        Ok(args) => args,
        Err(e) => fail(e),
    };
    let mut signals = match TerminationSignals::install() {
        Ok(signals) => signals,
        Err(e) => fail(format!("cannot install signal handlers: {e}")),
    };
    tracing::debug!(archive = %archive.display(), ?args, "warboot starting");

    let launcher = Launcher::new(settings);
    let teardown = launcher.teardown();
    let supervisor = launcher.supervisor();
    let mut launch = tokio::task::spawn_blocking(move || launcher.start(&archive, &args));

    let code = loop {
        tokio::select! {
            joined = &mut launch => match joined {
                Ok(code) => break code,
                Err(e) => {
                    eprintln!("ERROR: launcher aborted: {e}");
                    break 1;
                }
            },
            signal = signals.recv() => {
                if signal == Termination::Interrupt && supervisor.is_running() {
                    // The script shares the terminal's process group and got the interrupt too.
                    tracing::debug!("Interrupt left to the running script");
                    continue;
                }
                if supervisor.terminate() {
                    // The launch thread reaps the child and tears down.
                    let _ = (&mut launch).await;
                }
                break signal.exit_code();
            }
        }
    };

    teardown.run();
    std::process::exit(code);
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("ERROR: {message}");
    std::process::exit(1);
}

fn archive_path(settings: &warboot::LauncherSettings) -> std::io::Result<PathBuf> {
    match &settings.launcher.archive {
        Some(path) => Ok(path.clone()),
        None => std::env::current_exe(),
    }
}
