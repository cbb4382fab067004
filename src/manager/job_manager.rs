use log::{debug, info, warn};

use crate::config::ShellConfig;
use crate::error::Result;
use crate::manager::{job_table::JobTable, reaper, scheduler::Scheduler};
use crate::models::job::{JobRecord, JobStatus, Pid, Priority};
use crate::models::message::{JobListing, JobNotice, ListEntry};
use crate::models::transition::{JobEvent, Transition};
use crate::worker::process::{JobSignal, OsProcessControl, ProcessControl};

/// Owns the job table and is the only code that changes job state.
///
/// Every operation validates before mutating; on error the table is unchanged.
pub struct JobManager<P: ProcessControl = OsProcessControl> {
    table: JobTable,
    scheduler: Scheduler,
    control: P,
}

impl JobManager<OsProcessControl> {
    pub fn with_os_processes(config: &ShellConfig) -> Self {
        Self::new(config, OsProcessControl::new())
    }
}

impl<P: ProcessControl> JobManager<P> {
    pub fn new(config: &ShellConfig, control: P) -> Self {
        Self {
            table: JobTable::new(config.max_jobs),
            scheduler: Scheduler::new(config.max_running),
            control,
        }
    }

    pub fn table(&self) -> &JobTable {
        &self.table
    }

    pub fn control(&self) -> &P {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut P {
        &mut self.control
    }

    pub fn status_of(&self, pid: Pid) -> Option<JobStatus> {
        let slot = self.table.find_by_pid(pid).ok()?;
        self.table.get(slot).map(|r| r.status)
    }

    pub fn reap_completed(&mut self) -> Vec<JobNotice> {
        reaper::reap_completed(&mut self.table, &self.scheduler, &mut self.control)
    }

    /// Launches a job suspended and queues it as `Ready`, then lets the scheduler decide.
    pub fn run(&mut self, program: &str, args: &[String], priority: Priority) -> Result<Vec<JobNotice>> {
        let slot = self.table.find_unused_slot()?;
        let pid = self.control.spawn(program, args)?;

        // Suspend before anything else so the job only runs once admitted.
        if let Err(e) = self.control.signal(pid, JobSignal::Suspend) {
            warn!("Could not suspend new process {}: {}", pid, e);
        }

        let command = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self.table.allocate(slot, JobRecord::new(pid, command, priority))?;
        info!("Process {} queued in slot {} (Priority: {})", pid, slot, priority);

        let mut notices = vec![JobNotice::Queued(pid, priority)];
        notices.extend(self.scheduler.schedule(&mut self.table, &mut self.control));
        Ok(notices)
    }

    pub fn stop(&mut self, pid: Pid) -> Result<Vec<JobNotice>> {
        let (slot, transition) = self.plan(pid, JobEvent::Stop)?;
        self.send_all(pid, &transition.signals)?;

        let mut notices = vec![JobNotice::Stopping(pid)];
        self.commit(slot, &transition, &mut notices);
        Ok(notices)
    }

    /// Terminates a job without waiting for the process to exit.
    pub fn kill(&mut self, pid: Pid) -> Result<Vec<JobNotice>> {
        let (slot, transition) = self.plan(pid, JobEvent::Kill)?;
        if let Err(e) = self.send_all(pid, &transition.signals) {
            warn!("Marking process {} terminated anyway: {}", pid, e);
        }

        let mut notices = vec![JobNotice::Terminated(pid)];
        self.commit(slot, &transition, &mut notices);
        Ok(notices)
    }

    /// Continues a stopped job if a running slot is free, otherwise only marks it ready.
    ///
    /// The ready case does not invoke the scheduler; the job waits for the next
    /// stop, kill or completion to be admitted.
    pub fn resume(&mut self, pid: Pid) -> Result<Vec<JobNotice>> {
        let slot_free = self.scheduler.has_free_slot(&self.table);
        let (slot, transition) = self.plan(pid, JobEvent::Resume { slot_free })?;
        self.send_all(pid, &transition.signals)?;

        let mut notices = vec![JobNotice::Resuming(pid)];
        self.commit(slot, &transition, &mut notices);
        Ok(notices)
    }

    pub fn list(&self) -> JobListing {
        let entries = self
            .table
            .records()
            .map(|(_, r)| ListEntry {
                pid: r.pid,
                status: r.status,
                label: r.label().to_string(),
            })
            .collect();
        JobListing(entries)
    }

    /// Terminates every live job, then blocks until each job ever started has exited.
    ///
    /// Returns the pids that were waited for.
    pub fn shutdown(&mut self) -> Vec<Pid> {
        let live: Vec<(usize, Pid, JobStatus)> = self
            .table
            .records()
            .filter(|(_, r)| r.status != JobStatus::Terminated)
            .map(|(slot, r)| (slot, r.pid, r.status))
            .collect();

        for (_, pid, status) in &live {
            if let Ok(transition) = status.apply(*pid, JobEvent::Kill) {
                if let Err(e) = self.send_all(*pid, &transition.signals) {
                    warn!("{}", e);
                }
            }
        }

        let allocated: Vec<(usize, Pid)> = self.table.records().map(|(slot, r)| (slot, r.pid)).collect();
        for &(slot, pid) in &allocated {
            debug!("Waiting for process {}", pid);
            if let Err(e) = self.control.reap(pid) {
                warn!("Failed to reap process {}: {}", pid, e);
            }
            self.table.release(slot);
            self.table.set_status(slot, JobStatus::Terminated);
        }

        info!("Reaped {} processes", allocated.len());
        allocated.into_iter().map(|(_, pid)| pid).collect()
    }

    fn plan(&self, pid: Pid, event: JobEvent) -> Result<(usize, Transition)> {
        let slot = self.table.find_by_pid(pid)?;
        let status = self
            .table
            .get(slot)
            .map(|r| r.status)
            .unwrap_or(JobStatus::Terminated);
        Ok((slot, status.apply(pid, event)?))
    }

    fn send_all(&mut self, pid: Pid, signals: &[JobSignal]) -> Result<()> {
        signals
            .iter()
            .try_for_each(|&signal| self.control.signal(pid, signal))
    }

    fn commit(&mut self, slot: usize, transition: &Transition, notices: &mut Vec<JobNotice>) {
        if transition.release {
            self.table.release(slot);
        }
        self.table.set_status(slot, transition.next);
        if transition.schedule {
            notices.extend(self.scheduler.schedule(&mut self.table, &mut self.control));
        }
    }
}
