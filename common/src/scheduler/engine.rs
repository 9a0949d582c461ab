// Scheduler engine: fires each job when its cron trigger comes due

use super::jobs::{BillCheckJob, ScheduledJob, WeeklyReportJob};
use crate::config::SchedulerConfig;
use crate::db::DbPool;
use crate::errors::ScheduleError;
use crate::schedule::{parse_timezone, CronTrigger};
use crate::telemetry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Scheduler lifecycle
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Run the trigger loop until stopped or no trigger can fire again
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A job bound to its trigger
pub struct ScheduledEntry {
    pub job: Arc<dyn ScheduledJob>,
    pub trigger: CronTrigger,
}

impl ScheduledEntry {
    pub fn new(job: Arc<dyn ScheduledJob>, trigger: CronTrigger) -> Self {
        Self { job, trigger }
    }
}

pub struct SchedulerEngine {
    entries: Vec<ScheduledEntry>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SchedulerEngine {
    pub fn new(entries: Vec<ScheduledEntry>) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        Self {
            entries,
            shutdown_tx,
        }
    }

    /// Weekly reports and bill checks with the configured crons and timezone
    pub fn from_config(pool: DbPool, config: &SchedulerConfig) -> Result<Self, ScheduleError> {
        let timezone = parse_timezone(&config.timezone)?;
        let entries = vec![
            ScheduledEntry::new(
                Arc::new(WeeklyReportJob::new(pool.clone())),
                CronTrigger::new(&config.weekly_report_cron, timezone)?,
            ),
            ScheduledEntry::new(
                Arc::new(BillCheckJob::new(pool, config.bill_lookahead_days)),
                CronTrigger::new(&config.bill_check_cron, timezone)?,
            ),
        ];
        Ok(Self::new(entries))
    }

    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.job.name()).collect()
    }

    /// Next fire time of every entry; `None` once a trigger is exhausted
    fn initial_fires(&self, now: DateTime<Utc>) -> Vec<Option<DateTime<Utc>>> {
        self.entries
            .iter()
            .map(|entry| match entry.trigger.next_after(now) {
                Ok(next) => {
                    info!(job = entry.job.name(), next_run = %next, "Job scheduled");
                    Some(next)
                }
                Err(e) => {
                    warn!(job = entry.job.name(), error = %e, "Job will never run");
                    None
                }
            })
            .collect()
    }
}

/// Earliest pending fire time
pub fn next_due(fires: &[Option<DateTime<Utc>>]) -> Option<DateTime<Utc>> {
    fires.iter().flatten().min().copied()
}

/// Run a job once, logging and counting the outcome
#[instrument(skip(job), fields(job = job.name()))]
pub async fn run_job(job: &dyn ScheduledJob) -> bool {
    let started = Instant::now();
    let result = job.run().await;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(processed) => {
            info!(processed, duration_seconds = elapsed, "Job completed");
            telemetry::record_job_run(job.name(), "success", elapsed);
            true
        }
        Err(e) => {
            error!(error = %e, duration_seconds = elapsed, "Job failed");
            telemetry::record_job_run(job.name(), "failed", elapsed);
            false
        }
    }
}

#[async_trait]
impl Scheduler for SchedulerEngine {
    #[instrument(skip(self))]
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(jobs = ?self.job_names(), "Starting scheduler engine");

        let mut shutdown_rx = self.shutdown_receiver();
        let mut fires = self.initial_fires(Utc::now());

        while let Some(due) = next_due(&fires) {
            let wait = (due - Utc::now()).to_std().unwrap_or_default();
            debug!(next_run = %due, "Waiting for next job");

            tokio::select! {
                _ = sleep(wait) => {}
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping scheduler");
                    return Ok(());
                }
            }

            let now = Utc::now();
            for (entry, fire) in self.entries.iter().zip(fires.iter_mut()) {
                let Some(at) = *fire else { continue };
                if at > now {
                    continue;
                }
                run_job(entry.job.as_ref()).await;
                *fire = match entry.trigger.next_after(now) {
                    Ok(next) => Some(next),
                    Err(e) => {
                        warn!(job = entry.job.name(), error = %e, "Job will not run again");
                        None
                    }
                };
            }
        }

        info!("No triggers left, scheduler engine stopped");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Stopping scheduler engine");
        let _ = self.shutdown_tx.send(());
        Ok(())
    }
}
