use crate::error::{JobError, Result};
use crate::models::job::{JobRecord, JobStatus, Pid};

/// Fixed-capacity table of job records, indexed by slot.
///
/// Slots are handed out once and never reclaimed: a terminated record keeps
/// its pid, so it never looks unused again.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<JobRecord>>,
    running_count: usize,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            running_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn running_count(&self) -> usize {
        self.running_count
    }

    pub fn find_unused_slot(&self) -> Result<usize> {
        self.slots
            .iter()
            .position(Option::is_none)
            .ok_or(JobError::NoSlotAvailable)
    }

    pub fn find_by_pid(&self, pid: Pid) -> Result<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|r| r.pid == pid))
            .ok_or(JobError::NotFound(pid))
    }

    /// Places `record` in `slot`. The slot must be unused.
    pub fn allocate(&mut self, slot: usize, record: JobRecord) -> Result<()> {
        let entry = self.slots.get_mut(slot).ok_or(JobError::NoSlotAvailable)?;
        if entry.is_some() {
            return Err(JobError::NoSlotAvailable);
        }
        if record.status == JobStatus::Running {
            self.running_count += 1;
        }
        *entry = Some(record);
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Option<&JobRecord> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Changes a record's status, keeping the running count in step.
    pub fn set_status(&mut self, slot: usize, status: JobStatus) {
        let Some(record) = self.slots.get_mut(slot).and_then(Option::as_mut) else {
            return;
        };
        match (record.status == JobStatus::Running, status == JobStatus::Running) {
            (false, true) => self.running_count += 1,
            (true, false) => self.running_count -= 1,
            _ => {}
        }
        record.status = status;
    }

    /// Releases the record's owned command and priority label.
    pub fn release(&mut self, slot: usize) -> bool {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .is_some_and(JobRecord::release)
    }

    /// Occupied slots in slot order, which is also arrival order.
    pub fn records(&self) -> impl Iterator<Item = (usize, &JobRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|r| (slot, r)))
    }

    pub fn slots_with_status(&self, status: JobStatus) -> Vec<usize> {
        self.records()
            .filter(|(_, r)| r.status == status)
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records().next().is_none()
    }
}
