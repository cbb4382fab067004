use std::fmt;

use crate::models::job::{JobStatus, Pid, Priority};

/// Operator-facing outcome of a job operation, printed one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobNotice {
    Queued(Pid, Priority),
    Started(Pid, Priority),
    AdmissionFailed(Pid),
    Stopping(Pid),
    Resuming(Pid),
    Terminated(Pid),
    Completed(Pid),
}

impl JobNotice {
    pub fn pid(&self) -> Pid {
        match *self {
            JobNotice::Queued(pid, _)
            | JobNotice::Started(pid, _)
            | JobNotice::AdmissionFailed(pid)
            | JobNotice::Stopping(pid)
            | JobNotice::Resuming(pid)
            | JobNotice::Terminated(pid)
            | JobNotice::Completed(pid) => pid,
        }
    }
}

impl fmt::Display for JobNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobNotice::Queued(pid, priority) => {
                write!(f, "Process {} queued (Priority: {})", pid, priority)
            }
            JobNotice::Started(pid, priority) => {
                write!(f, "Process {} started (Priority: {})", pid, priority)
            }
            JobNotice::AdmissionFailed(pid) => write!(f, "Failed to resume process {}", pid),
            JobNotice::Stopping(pid) => write!(f, "stopping {}", pid),
            JobNotice::Resuming(pid) => write!(f, "resuming {}", pid),
            JobNotice::Terminated(pid) => write!(f, "Process {} terminated", pid),
            JobNotice::Completed(pid) => write!(f, "Process {} completed", pid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub pid: Pid,
    pub status: JobStatus,
    pub label: String,
}

/// Snapshot of every allocated slot, rendered by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobListing(pub Vec<ListEntry>);

impl JobListing {
    pub fn entries(&self) -> &[ListEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JobListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PID\t\tSTATE\tPRIORITY")?;
        if self.0.is_empty() {
            return write!(f, "No processes to list");
        }
        let rows: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}\t\t{}\t\t{}", e.pid, e.status.code(), e.label))
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_lines() {
        let p2 = Priority::new(2).unwrap();
        assert_eq!(JobNotice::Queued(41, p2).to_string(), "Process 41 queued (Priority: P2)");
        assert_eq!(JobNotice::Started(41, p2).to_string(), "Process 41 started (Priority: P2)");
        assert_eq!(JobNotice::Stopping(41).to_string(), "stopping 41");
        assert_eq!(JobNotice::Completed(41).pid(), 41);
    }

    #[test]
    fn empty_listing() {
        let listing = JobListing(Vec::new());
        assert_eq!(listing.to_string(), "PID\t\tSTATE\tPRIORITY\nNo processes to list");
    }

    #[test]
    fn listing_rows() {
        let listing = JobListing(vec![
            ListEntry { pid: 10, status: JobStatus::Running, label: "P1".into() },
            ListEntry { pid: 11, status: JobStatus::Terminated, label: "-".into() },
        ]);
        assert_eq!(
            listing.to_string(),
            "PID\t\tSTATE\tPRIORITY\n10\t\t0\t\tP1\n11\t\t3\t\t-"
        );
    }
}
