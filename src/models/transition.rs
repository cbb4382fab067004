//! Job state machine.
//!
//! `JobStatus::apply` is a pure function: it decides the next status and the
//! side effects an event calls for, but performs none of them. The job manager
//! carries the effects out against a `ProcessControl`.

use crate::error::{JobError, Result};
use crate::models::job::{JobStatus, Pid};
use crate::worker::process::JobSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    /// The scheduler picked this job for a free running slot.
    Admit,
    Stop,
    Kill,
    Resume { slot_free: bool },
    /// The OS reported that the process exited.
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: JobStatus,
    /// Signals to send, in order.
    pub signals: Vec<JobSignal>,
    /// Release the record's command and priority label.
    pub release: bool,
    /// Run the admission scheduler afterwards.
    pub schedule: bool,
}

impl Transition {
    fn to(next: JobStatus) -> Self {
        Self {
            next,
            signals: Vec::new(),
            release: false,
            schedule: false,
        }
    }

    fn signal(mut self, signal: JobSignal) -> Self {
        self.signals.push(signal);
        self
    }

    fn released(mut self) -> Self {
        self.release = true;
        self
    }

    fn scheduled(mut self) -> Self {
        self.schedule = true;
        self
    }
}

impl JobStatus {
    pub fn apply(self, pid: Pid, event: JobEvent) -> Result<Transition> {
        use JobStatus::*;

        if self == Terminated {
            return Err(JobError::AlreadyTerminated(pid));
        }

        let transition = match (self, event) {
            (Ready, JobEvent::Admit) => Transition::to(Running).signal(JobSignal::Continue),
            (_, JobEvent::Admit) => return Err(JobError::NotReady(pid)),

            (Running, JobEvent::Stop) => Transition::to(Stopped)
                .signal(JobSignal::Suspend)
                .scheduled(),
            (Stopped, JobEvent::Stop) => return Err(JobError::AlreadyStopped(pid)),
            (_, JobEvent::Stop) => return Err(JobError::NotRunning(pid)),

            // A suspended process keeps SIGTERM pending until it is continued.
            (Running, JobEvent::Kill) => Transition::to(Terminated)
                .signal(JobSignal::Terminate)
                .released()
                .scheduled(),
            (_, JobEvent::Kill) => Transition::to(Terminated)
                .signal(JobSignal::Terminate)
                .signal(JobSignal::Continue)
                .released()
                .scheduled(),

            (Stopped, JobEvent::Resume { slot_free: true }) => {
                Transition::to(Running).signal(JobSignal::Continue)
            }
            (Stopped, JobEvent::Resume { slot_free: false }) => Transition::to(Ready),
            (_, JobEvent::Resume { .. }) => return Err(JobError::NotStopped(pid)),

            (_, JobEvent::Exit) => Transition::to(Terminated).released().scheduled(),
        };

        Ok(transition)
    }
}
