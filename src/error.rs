use std::io;

use thiserror::Error;

use crate::models::job::Pid;
use crate::worker::process::JobSignal;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("{0}")]
    InvalidArguments(String),

    #[error("Error: Invalid priority format '{0}'. Use P1, P2, P3, etc.")]
    InvalidPriority(String),

    #[error("Error: No process slots available")]
    NoSlotAvailable,

    #[error("Error: Process {0} not found")]
    NotFound(Pid),

    #[error("Error: Process {0} is already terminated")]
    AlreadyTerminated(Pid),

    #[error("Error: Process {0} is already stopped")]
    AlreadyStopped(Pid),

    #[error("Error: Process {0} is not running")]
    NotRunning(Pid),

    #[error("Error: Process {0} is not stopped")]
    NotStopped(Pid),

    #[error("Error: Process {0} is not ready to be admitted")]
    NotReady(Pid),

    #[error("Error: Failed to send {signal} to process {pid}: {source}")]
    SignalDeliveryFailed {
        pid: Pid,
        signal: JobSignal,
        #[source]
        source: io::Error,
    },

    #[error("Error: fork failed: {0}")]
    ForkFailed(#[source] io::Error),

    #[error("Error: Failed to execute '{program}': {source}")]
    ExecFailed {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, JobError>;
