use log::{debug, warn};

use crate::manager::job_table::JobTable;
use crate::models::job::JobStatus;
use crate::models::message::JobNotice;
use crate::models::transition::JobEvent;
use crate::worker::process::ProcessControl;

/// Static-priority admission control over a bounded number of running slots.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    max_running: usize,
}

impl Scheduler {
    pub fn new(max_running: usize) -> Self {
        Self { max_running }
    }

    pub fn max_running(&self) -> usize {
        self.max_running
    }

    pub fn has_free_slot(&self, table: &JobTable) -> bool {
        table.running_count() < self.max_running
    }

    /// Admits ready jobs, best priority first, until the running budget is used up.
    ///
    /// A job whose continue signal fails keeps its status and is not retried
    /// until the next invocation.
    pub fn schedule<P: ProcessControl>(&self, table: &mut JobTable, control: &mut P) -> Vec<JobNotice> {
        debug!(
            "Scheduling processes. Running count: {}/{}",
            table.running_count(),
            self.max_running
        );

        let mut notices = Vec::new();
        let mut failed: Vec<usize> = Vec::new();

        while self.has_free_slot(table) {
            let Some(slot) = select_next(table, &failed) else {
                debug!("No ready processes found");
                break;
            };
            let Some(record) = table.get(slot) else {
                break;
            };
            let (pid, priority) = (record.pid, record.priority);
            debug!("Found ready process {} (Priority: {})", pid, priority);

            let transition = match record.status.apply(pid, JobEvent::Admit) {
                Ok(transition) => transition,
                Err(e) => {
                    warn!("{}", e);
                    failed.push(slot);
                    continue;
                }
            };

            let delivered = transition
                .signals
                .iter()
                .try_for_each(|&signal| control.signal(pid, signal));

            match delivered {
                Ok(()) => {
                    table.set_status(slot, transition.next);
                    notices.push(JobNotice::Started(pid, priority));
                }
                Err(e) => {
                    warn!("Admission of process {} failed: {}", pid, e);
                    failed.push(slot);
                    notices.push(JobNotice::AdmissionFailed(pid));
                }
            }
        }

        notices
    }
}

/// The ready job with the smallest priority number, earliest arrival on ties.
pub fn select_next(table: &JobTable, skip: &[usize]) -> Option<usize> {
    table
        .records()
        .filter(|(slot, r)| r.status == JobStatus::Ready && !skip.contains(slot))
        .min_by_key(|(slot, r)| (r.priority, r.arrived_at, *slot))
        .map(|(slot, _)| slot)
}
