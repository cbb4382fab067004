pub mod job_manager;
pub mod job_table;
pub mod reaper;
pub mod scheduler;
