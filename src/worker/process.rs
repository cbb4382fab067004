use std::{
    collections::HashMap,
    fmt, io,
    process::{Child, Command, Stdio},
};

use log::{debug, error, warn};

use crate::error::{JobError, Result};
use crate::models::job::Pid;

/// The three process controls the shell uses on its jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSignal {
    Suspend,
    Continue,
    Terminate,
}

impl JobSignal {
    pub fn as_raw(self) -> libc::c_int {
        match self {
            JobSignal::Suspend => libc::SIGSTOP,
            JobSignal::Continue => libc::SIGCONT,
            JobSignal::Terminate => libc::SIGTERM,
        }
    }
}

impl fmt::Display for JobSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobSignal::Suspend => "SIGSTOP",
            JobSignal::Continue => "SIGCONT",
            JobSignal::Terminate => "SIGTERM",
        };
        f.write_str(name)
    }
}

/// Capability to create and control job processes.
///
/// The job manager never touches the OS directly; tests substitute a fake.
pub trait ProcessControl {
    /// Starts `program` with `args`, output discarded. Returns the child's pid.
    fn spawn(&mut self, program: &str, args: &[String]) -> Result<Pid>;

    fn signal(&mut self, pid: Pid, signal: JobSignal) -> Result<()>;

    /// Non-blocking exit check. `Ok(true)` once the process has exited.
    fn try_reap(&mut self, pid: Pid) -> Result<bool>;

    /// Blocks until the process has exited.
    fn reap(&mut self, pid: Pid) -> Result<()>;
}

/// `ProcessControl` backed by real child processes.
#[derive(Default)]
pub struct OsProcessControl {
    children: HashMap<Pid, Child>,
}

impl OsProcessControl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessControl for OsProcessControl {
    fn spawn(&mut self, program: &str, args: &[String]) -> Result<Pid> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let pid = child.id();
        debug!("Spawned '{}' as process {}", program, pid);
        self.children.insert(pid, child);
        Ok(pid)
    }

    fn signal(&mut self, pid: Pid, signal: JobSignal) -> Result<()> {
        let delivery_failed = |source: io::Error| JobError::SignalDeliveryFailed { pid, signal, source };
        let raw_pid = libc::pid_t::try_from(pid)
            .map_err(|_| delivery_failed(io::Error::from(io::ErrorKind::InvalidInput)))?;

        let rc = unsafe { libc::kill(raw_pid, signal.as_raw()) };
        if rc == 0 {
            Ok(())
        } else {
            let source = io::Error::last_os_error();
            warn!("Failed to send {} to process {}: {}", signal, pid, source);
            Err(delivery_failed(source))
        }
    }

    fn try_reap(&mut self, pid: Pid) -> Result<bool> {
        let Some(child) = self.children.get_mut(&pid) else {
            return Ok(true);
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Process {} exited with {}", pid, status);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                error!("Failed to poll process {}: {}", pid, e);
                Ok(false)
            }
        }
    }

    fn reap(&mut self, pid: Pid) -> Result<()> {
        if let Some(mut child) = self.children.remove(&pid) {
            match child.wait() {
                Ok(status) => debug!("Process {} reaped with {}", pid, status),
                Err(e) => error!("Failed to wait for process {}: {}", pid, e),
            }
        }
        Ok(())
    }
}

/// Separates failures of process creation itself from failures to load the program.
fn spawn_error(program: &str, source: io::Error) -> JobError {
    match source.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::ENOMEM) => JobError::ForkFailed(source),
        _ => JobError::ExecFailed {
            program: program.to_string(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_mapping() {
        assert_eq!(JobSignal::Suspend.as_raw(), libc::SIGSTOP);
        assert_eq!(JobSignal::Continue.as_raw(), libc::SIGCONT);
        assert_eq!(JobSignal::Terminate.as_raw(), libc::SIGTERM);
        assert_eq!(JobSignal::Terminate.to_string(), "SIGTERM");
    }

    #[test]
    fn resource_exhaustion_is_a_fork_failure() {
        let err = spawn_error("x", io::Error::from_raw_os_error(libc::EAGAIN));
        assert!(matches!(err, JobError::ForkFailed(_)));

        let err = spawn_error("x", io::Error::from_raw_os_error(libc::ENOENT));
        assert!(matches!(err, JobError::ExecFailed { .. }));
    }

    #[test]
    fn unknown_pid_counts_as_reaped() {
        let mut control = OsProcessControl::new();
        assert!(control.try_reap(424242).unwrap());
        assert!(control.reap(424242).is_ok());
    }
}
