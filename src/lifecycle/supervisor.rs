//! Ownership of the child process a launch is waiting on.
//!
//! The blocking launch spawns and waits through [`ChildSupervisor`]; the
//! signal path asks it whether a child is running and terminates that child
//! before teardown removes the files it works in.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Exit status and captured stdout of a supervised child.
#[derive(Debug)]
pub struct Supervised {
    pub status: ExitStatus,
    /// Empty unless stdout was captured.
    pub stdout: Vec<u8>,
}

#[derive(Debug, Default)]
struct Slot {
    child: Option<Child>,
    terminating: bool,
}

/// At most one running child, reachable from the signal path.
#[derive(Debug, Default)]
pub struct ChildSupervisor {
    slot: Mutex<Slot>,
}

impl ChildSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a child is currently running.
    pub fn is_running(&self) -> bool {
        self.slot().child.is_some()
    }

    /// Whether [`ChildSupervisor::terminate`] has been called.
    pub fn is_terminating(&self) -> bool {
        self.slot().terminating
    }

    /// Spawn `command` and block until it exits. Stdio is inherited.
    pub fn run(&self, command: &mut Command) -> io::Result<ExitStatus> {
        self.supervise(command, false).map(|supervised| supervised.status)
    }

    /// Spawn `command` with stdout captured and block until it exits.
    pub fn output(&self, command: &mut Command) -> io::Result<Supervised> {
        self.supervise(command, true)
    }

    /// Kill the running child and refuse to spawn new ones.
    ///
    /// Returns `true` if a child was running.
    pub fn terminate(&self) -> bool {
        let mut slot = self.slot();
        slot.terminating = true;
        match slot.child.as_mut() {
            Some(child) => {
                tracing::debug!(pid = child.id(), "Terminating child process");
                if let Err(e) = child.kill() {
                    tracing::warn!(pid = child.id(), error = %e, "Failed to kill child process");
                }
                true
            }
            None => false,
        }
    }

    fn supervise(&self, command: &mut Command, capture: bool) -> io::Result<Supervised> {
        let reader = {
            let mut slot = self.slot();
            if slot.terminating {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "shutdown requested before the child was started",
                ));
            }
            if capture {
                command.stdout(Stdio::piped());
            }
            let mut child = command.spawn()?;
            tracing::debug!(pid = child.id(), "Child process started");

            let reader = child.stdout.take().map(|mut stdout| {
                thread::spawn(move || {
                    let mut buf = Vec::new();
                    stdout.read_to_end(&mut buf).map(|_| buf)
                })
            });
            slot.child = Some(child);
            reader
        };

        let status = self.wait()?;
        let stdout = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdout reader panicked"))??,
            None => Vec::new(),
        };
        Ok(Supervised { status, stdout })
    }

    fn wait(&self) -> io::Result<ExitStatus> {
        loop {
            {
                let mut slot = self.slot();
                let Some(child) = slot.child.as_mut() else {
                    return Err(io::Error::new(io::ErrorKind::Other, "no child to wait for"));
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        tracing::debug!(pid = child.id(), ?status, "Child process exited");
                        slot.child = None;
                        return Ok(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        slot.child = None;
                        return Err(e);
                    }
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_run_reports_exit_status() {
        let supervisor = ChildSupervisor::new();
        let status = supervisor
            .run(Command::new("sh").args(["-c", "exit 5"]))
            .unwrap();
        assert_eq!(status.code(), Some(5));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_output_captures_stdout() {
        let supervisor = ChildSupervisor::new();
        let out = supervisor
            .output(Command::new("sh").args(["-c", "echo found"]))
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout), "found\n");
    }

    #[test]
    fn test_terminate_kills_running_child() {
        let supervisor = Arc::new(ChildSupervisor::new());
        let waiter = {
            let supervisor = supervisor.clone();
            thread::spawn(move || supervisor.run(Command::new("sleep").arg("30")))
        };

        let started = Instant::now();
        while !supervisor.is_running() {
            assert!(started.elapsed() < Duration::from_secs(10));
            thread::sleep(Duration::from_millis(5));
        }
        assert!(supervisor.terminate());

        let status = waiter.join().unwrap().unwrap();
        assert!(!status.success());
        assert!(started.elapsed() < Duration::from_secs(20));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_no_spawn_after_terminate() {
        let supervisor = ChildSupervisor::new();
        assert!(!supervisor.terminate());
        let err = supervisor.run(&mut Command::new("true")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }
}
