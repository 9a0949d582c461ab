// Scheduler module: cron-triggered notification jobs

pub mod engine;
pub mod jobs;

pub use engine::{run_job, Scheduler, ScheduledEntry, SchedulerEngine};
pub use jobs::{BillCheckJob, ScheduledJob, WeeklyReportJob, BILL_CHECK_JOB, WEEKLY_REPORTS_JOB};
