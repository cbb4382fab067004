//! Shared helpers for job shell integration tests.
//!
//! `FakeProcessControl` stands in for the OS: it hands out pids, records every
//! signal, and lets tests decide when a process exits or disappears.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io;

use job_shell::config::ShellConfig;
use job_shell::error::{JobError, Result};
use job_shell::manager::job_manager::JobManager;
use job_shell::models::job::{JobStatus, Pid, Priority};
use job_shell::worker::process::{JobSignal, ProcessControl};

pub const FIRST_PID: Pid = 1000;

#[derive(Debug)]
pub struct FakeProcessControl {
    next_pid: Pid,
    pub spawned: Vec<(Pid, String, Vec<String>)>,
    pub signals: Vec<(Pid, JobSignal)>,
    pub reaped: Vec<Pid>,
    exited: HashSet<Pid>,
    vanished: HashSet<Pid>,
    missing_programs: HashSet<String>,
}

impl Default for FakeProcessControl {
    fn default() -> Self {
        Self {
            next_pid: FIRST_PID,
            spawned: Vec::new(),
            signals: Vec::new(),
            reaped: Vec::new(),
            exited: HashSet::new(),
            vanished: HashSet::new(),
            missing_programs: HashSet::new(),
        }
    }
}

impl FakeProcessControl {
    /// The process exits on its own; the next non-blocking reap sees it.
    pub fn exit(&mut self, pid: Pid) {
        self.exited.insert(pid);
    }

    /// Signals to this pid fail as if the process no longer existed.
    pub fn vanish(&mut self, pid: Pid) {
        self.vanished.insert(pid);
    }

    pub fn missing_program(&mut self, program: &str) {
        self.missing_programs.insert(program.to_string());
    }

    pub fn signals_for(&self, pid: Pid) -> Vec<JobSignal> {
        self.signals
            .iter()
            .filter(|(p, _)| *p == pid)
            .map(|(_, s)| *s)
            .collect()
    }
}

impl ProcessControl for FakeProcessControl {
    fn spawn(&mut self, program: &str, args: &[String]) -> Result<Pid> {
        if self.missing_programs.contains(program) {
            return Err(JobError::ExecFailed {
                program: program.to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        let pid = self.next_pid;
        self.next_pid += 1;
        self.spawned.push((pid, program.to_string(), args.to_vec()));
        Ok(pid)
    }

    fn signal(&mut self, pid: Pid, signal: JobSignal) -> Result<()> {
        if self.vanished.contains(&pid) {
            return Err(JobError::SignalDeliveryFailed {
                pid,
                signal,
                source: io::Error::from_raw_os_error(libc::ESRCH),
            });
        }
        self.signals.push((pid, signal));
        Ok(())
    }

    fn try_reap(&mut self, pid: Pid) -> Result<bool> {
        Ok(self.exited.contains(&pid))
    }

    fn reap(&mut self, pid: Pid) -> Result<()> {
        self.exited.insert(pid);
        self.reaped.push(pid);
        Ok(())
    }
}

pub fn manager(max_jobs: usize, max_running: usize) -> JobManager<FakeProcessControl> {
    JobManager::new(
        &ShellConfig::new(max_jobs, max_running),
        FakeProcessControl::default(),
    )
}

pub fn priority(n: u32) -> Priority {
    Priority::new(n).expect("priority must be positive")
}

/// Runs `sleep 60` at priority `P<n>` and returns the new pid.
pub fn run_job(manager: &mut JobManager<FakeProcessControl>, n: u32) -> Pid {
    manager
        .run("sleep", &["60".to_string()], priority(n))
        .expect("run should succeed");
    manager
        .control()
        .spawned
        .last()
        .map(|(pid, _, _)| *pid)
        .expect("a process was spawned")
}

/// The running counter must match the number of `Running` records.
pub fn assert_counter_consistent<P: ProcessControl>(manager: &JobManager<P>) {
    let running = manager
        .table()
        .records()
        .filter(|(_, r)| r.status == JobStatus::Running)
        .count();
    assert_eq!(manager.table().running_count(), running, "running counter drifted");
}

pub fn status(manager: &JobManager<FakeProcessControl>, pid: Pid) -> JobStatus {
    manager.status_of(pid).expect("pid should be in the table")
}
