use log::{debug, info, warn};

use crate::manager::job_table::JobTable;
use crate::manager::scheduler::Scheduler;
use crate::models::job::JobStatus;
use crate::models::message::JobNotice;
use crate::models::transition::JobEvent;
use crate::worker::process::ProcessControl;

/// Polls running jobs for exit without blocking and marks exited ones terminated.
///
/// Only runs between commands, so an exit is noticed the next time the
/// operator submits a line.
pub fn reap_completed<P: ProcessControl>(
    table: &mut JobTable,
    scheduler: &Scheduler,
    control: &mut P,
) -> Vec<JobNotice> {
    let mut notices = Vec::new();

    for slot in table.slots_with_status(JobStatus::Running) {
        let Some(record) = table.get(slot) else {
            continue;
        };
        let pid = record.pid;

        match control.try_reap(pid) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Failed to check process {}: {}", pid, e);
                continue;
            }
        }

        let transition = match record.status.apply(pid, JobEvent::Exit) {
            Ok(transition) => transition,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        info!("Process {} completed", pid);
        notices.push(JobNotice::Completed(pid));
        if transition.release {
            table.release(slot);
        }
        table.set_status(slot, transition.next);
        debug!("Running count after completion: {}", table.running_count());

        if transition.schedule {
            notices.extend(scheduler.schedule(table, control));
        }
    }

    notices
}
