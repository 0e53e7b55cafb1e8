//! Scheduled deletion of events past the retention window.
//!
//! Runs alongside the 100-day TTL index and enforces the shorter window.

use crate::config::{PURGE_SCHEDULE, validate_retention_days};
use crate::error::{ActivityLogError, Result};
use crate::models::{LogCollection, PurgeReport};
use crate::store::LogEventStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Delete events older than `retention_days` from both collections.
///
/// Inserts racing with the delete are unaffected: anything newer than the
/// cutoff is kept, anything older is a candidate. Each collection is purged
/// even if the other fails; the first failure is returned after both ran.
#[instrument(skip(store))]
pub async fn purge_expired(store: &dyn LogEventStore, retention_days: u32) -> Result<PurgeReport> {
    validate_retention_days(retention_days)?;
    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));

    let mut first_error: Option<ActivityLogError> = None;
    let mut report = PurgeReport {
        cutoff,
        login_events: 0,
        action_events: 0,
    };

    for collection in [LogCollection::LoginEvents, LogCollection::ActionEvents] {
        match store.delete_before(collection, cutoff).await {
            Ok(deleted) => match collection {
                LogCollection::LoginEvents => report.login_events = deleted,
                LogCollection::ActionEvents => report.action_events = deleted,
            },
            Err(e) => {
                error!(%collection, error = %e, "Purge failed; 0 events deleted");
                first_error.get_or_insert(e);
            }
        }
    }

    info!(
        login_events = report.login_events,
        action_events = report.action_events,
        cutoff = %report.cutoff,
        "Purged expired activity events"
    );

    match first_error {
        Some(e) => Err(e),
        None => Ok(report),
    }
}

struct RunningJob {
    scheduler: JobScheduler,
    job_id: Uuid,
}

/// Owns the daily purge job.
///
/// `start` is idempotent and `stop` is safe before `start`. A failed run is
/// logged and left for the next tick to catch up.
pub struct RetentionScheduler {
    store: Arc<dyn LogEventStore>,
    retention_days: u32,
    schedule: String,
    running: Mutex<Option<RunningJob>>,
}

impl RetentionScheduler {
    pub fn new(store: Arc<dyn LogEventStore>, retention_days: u32) -> Self {
        Self {
            store,
            retention_days,
            schedule: PURGE_SCHEDULE.to_string(),
            running: Mutex::new(None),
        }
    }

    /// Builder: replace the cron expression (six fields, seconds first, UTC)
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Run a purge now with an explicit window.
    pub async fn purge(&self, retention_days: u32) -> Result<PurgeReport> {
        purge_expired(self.store.as_ref(), retention_days).await
    }

    fn purge_job(&self) -> Result<Job> {
        let store = Arc::clone(&self.store);
        let retention_days = self.retention_days;

        // Cron expressions are evaluated in UTC.
        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _scheduler| {
            let store = Arc::clone(&store);
            Box::pin(async move {
                if let Err(e) = purge_expired(store.as_ref(), retention_days).await {
                    error!(error = %e, "Scheduled purge failed");
                }
            })
        })?;
        Ok(job)
    }

    /// Register and start the purge job, returning its id.
    ///
    /// A second call while running returns the existing job's id.
    pub async fn start(&self) -> Result<Uuid> {
        let mut running = self.running.lock().await;
        if let Some(job) = running.as_ref() {
            debug!(job_id = %job.job_id, "Retention scheduler already running");
            return Ok(job.job_id);
        }

        let scheduler = JobScheduler::new().await?;
        let job_id = scheduler.add(self.purge_job()?).await?;
        scheduler.start().await?;

        info!(
            %job_id,
            schedule = %self.schedule,
            retention_days = self.retention_days,
            "Retention scheduler started"
        );

        *running = Some(RunningJob { scheduler, job_id });
        Ok(job_id)
    }

    /// Stop the purge job if it is running.
    pub async fn stop(&self) -> Result<()> {
        let Some(mut job) = self.running.lock().await.take() else {
            return Ok(());
        };

        job.scheduler.remove(&job.job_id).await?;
        job.scheduler.shutdown().await?;
        info!(job_id = %job.job_id, "Retention scheduler stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub async fn job_id(&self) -> Option<Uuid> {
        self.running.lock().await.as_ref().map(|job| job.job_id)
    }

    /// Next time the purge job fires, if running.
    pub async fn next_run(&self) -> Result<Option<DateTime<Utc>>> {
        let running = self.running.lock().await;
        let Some(job) = running.as_ref() else {
            return Ok(None);
        };

        let mut scheduler = job.scheduler.clone();
        Ok(scheduler.next_tick_for_job(job.job_id).await?)
    }
}
