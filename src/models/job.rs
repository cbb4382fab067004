use std::{fmt, str::FromStr, time::Instant};

use crate::error::JobError;

pub type Pid = u32;

/// Static job priority parsed from a `P<n>` token. Smaller numbers are more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u32);

impl Priority {
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl FromStr for Priority {
    type Err = JobError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || JobError::InvalidPriority(token.to_string());
        let digits = token.strip_prefix('P').ok_or_else(invalid)?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        digits.parse::<u32>().map(Self).map_err(|_| invalid())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Running,
    Ready,
    Stopped,
    Terminated,
}

impl JobStatus {
    /// Numeric state code shown by `list`.
    pub fn code(self) -> u8 {
        match self {
            JobStatus::Running => 0,
            JobStatus::Ready => 1,
            JobStatus::Stopped => 2,
            JobStatus::Terminated => 3,
        }
    }
}

/// One admitted job. Lives in its table slot forever, even after termination.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub pid: Pid,
    pub status: JobStatus,
    pub command: Option<String>,
    pub priority: Priority,
    pub priority_label: Option<String>,
    pub arrived_at: Instant,
}

impl JobRecord {
    /// New records start `Ready`: the child has been forked and suspended but not admitted.
    pub fn new(pid: Pid, command: String, priority: Priority) -> Self {
        Self {
            pid,
            status: JobStatus::Ready,
            command: Some(command),
            priority,
            priority_label: Some(priority.to_string()),
            arrived_at: Instant::now(),
        }
    }

    /// Drops the owned command and label. Returns false if they were already gone.
    pub fn release(&mut self) -> bool {
        let had_command = self.command.take().is_some();
        let had_label = self.priority_label.take().is_some();
        had_command || had_label
    }

    pub fn is_released(&self) -> bool {
        self.command.is_none() && self.priority_label.is_none()
    }

    pub fn label(&self) -> &str {
        self.priority_label.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_priorities() {
        assert_eq!("P1".parse::<Priority>().unwrap().value(), 1);
        assert_eq!("P42".parse::<Priority>().unwrap().value(), 42);
        assert_eq!("P10".parse::<Priority>().unwrap().to_string(), "P10");
    }

    #[test]
    fn rejects_malformed_priorities() {
        for token in ["", "P", "P0", "P01", "p1", "1", "P-1", "P1x", "PP1", "P99999999999"] {
            assert!(
                matches!(token.parse::<Priority>(), Err(JobError::InvalidPriority(_))),
                "{token:?} should be rejected"
            );
        }
    }

    #[test]
    fn smaller_number_orders_first() {
        assert!(Priority::new(1).unwrap() < Priority::new(2).unwrap());
        assert!(Priority::new(0).is_none());
    }

    #[test]
    fn release_happens_once() {
        let mut record = JobRecord::new(7, "sleep 5".to_string(), Priority::new(2).unwrap());
        assert_eq!(record.status, JobStatus::Ready);
        assert_eq!(record.label(), "P2");
        assert!(record.release());
        assert!(record.is_released());
        assert!(!record.release());
        assert_eq!(record.label(), "-");
    }

    #[test]
    fn status_codes() {
        assert_eq!(JobStatus::Running.code(), 0);
        assert_eq!(JobStatus::Ready.code(), 1);
        assert_eq!(JobStatus::Stopped.code(), 2);
        assert_eq!(JobStatus::Terminated.code(), 3);
    }
}
