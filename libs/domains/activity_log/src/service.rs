//! Lifecycle owner and process-wide entry points

use crate::config::{ActivityLogConfig, TTL_DAYS};
use crate::context::RequestContext;
use crate::error::{ActivityLogError, Result};
use crate::models::PurgeReport;
use crate::mongo_store::MongoLogStore;
use crate::recorder::EventRecorder;
use crate::retention::RetentionScheduler;
use database::mongodb::HealthStatus;
use mongodb::bson::Document;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

struct Inner {
    store: Arc<MongoLogStore>,
    recorder: EventRecorder,
    scheduler: RetentionScheduler,
    shut_down: AtomicBool,
}

/// The activity log service: one store, one recorder, one purge job.
///
/// Construct it once in the composition root and clone the handle wherever
/// events are recorded. Only [`shutdown`](Self::shutdown) closes the store.
#[derive(Clone)]
pub struct ActivityLog {
    inner: Arc<Inner>,
}

impl ActivityLog {
    /// Connect, create indexes and start the retention job.
    ///
    /// Any failure here is fatal for the caller: a deployment without its
    /// activity log should not come up.
    #[instrument(skip_all, fields(database = %config.mongo.database()))]
    pub async fn init(config: &ActivityLogConfig) -> Result<Self> {
        config.validate()?;
        if u64::from(config.retention_days) > TTL_DAYS {
            warn!(
                retention_days = config.retention_days,
                ttl_days = TTL_DAYS,
                "Retention window exceeds the TTL index; the TTL index will expire events first"
            );
        }

        let store = Arc::new(MongoLogStore::connect(&config.mongo).await?);
        if let Err(e) = store.ensure_indexes().await {
            store.close().await;
            return Err(e);
        }

        Self::with_store(store, config.retention_days).await
    }

    /// Build the service on an already connected store and start the purge job.
    pub async fn with_store(store: Arc<MongoLogStore>, retention_days: u32) -> Result<Self> {
        let scheduler = RetentionScheduler::new(store.clone(), retention_days);
        Self::with_scheduler(store, scheduler).await
    }

    /// Start `scheduler` and assemble the service. The store is closed if the
    /// scheduler cannot start.
    async fn with_scheduler(store: Arc<MongoLogStore>, scheduler: RetentionScheduler) -> Result<Self> {
        if let Err(e) = scheduler.start().await {
            store.close().await;
            return Err(e);
        }

        let recorder = EventRecorder::new(store.clone());
        info!(
            retention_days = scheduler.retention_days(),
            "Activity log initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                recorder,
                scheduler,
                shut_down: AtomicBool::new(false),
            }),
        })
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.inner.recorder
    }

    pub fn scheduler(&self) -> &RetentionScheduler {
        &self.inner.scheduler
    }

    pub fn store(&self) -> &MongoLogStore {
        &self.inner.store
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::Acquire)
    }

    pub async fn log_login(
        &self,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        role: Option<&str>,
        status: &str,
        ip_addr: &str,
    ) -> bool {
        self.inner
            .recorder
            .log_login(ctx, user_id, email, role, status, ip_addr)
            .await
    }

    pub async fn log_logout(
        &self,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        role: Option<&str>,
    ) -> bool {
        self.inner.recorder.log_logout(ctx, user_id, email, role).await
    }

    pub async fn log_action(
        &self,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        role: &str,
        action_type: &str,
        extra: Document,
    ) -> bool {
        self.inner
            .recorder
            .log_action(ctx, user_id, email, role, action_type, extra)
            .await
    }

    /// Purge now using the configured retention window.
    pub async fn purge_now(&self) -> Result<PurgeReport> {
        let scheduler = &self.inner.scheduler;
        scheduler.purge(scheduler.retention_days()).await
    }

    pub async fn health(&self) -> HealthStatus {
        self.inner.store.health().await
    }

    /// Stop the purge job and close the store. Idempotent.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Err(e) = self.inner.scheduler.stop().await {
            warn!(error = %e, "Failed to stop retention scheduler");
        }
        self.inner.store.close().await;
        info!("Activity log shut down");
    }
}

static GLOBAL: OnceCell<ActivityLog> = OnceCell::const_new();

/// Initialize the process-wide instance.
///
/// Concurrent callers race safely: exactly one instance is built and every
/// caller receives it. If construction fails the cell stays empty and a later
/// call may retry. The instance is not rebuilt after [`shutdown`]; later calls
/// fail with [`ActivityLogError::Closed`].
pub async fn init(config: &ActivityLogConfig) -> Result<&'static ActivityLog> {
    let log = GLOBAL.get_or_try_init(|| ActivityLog::init(config)).await?;
    if log.is_shut_down() {
        return Err(ActivityLogError::Closed);
    }
    Ok(log)
}

/// The process-wide instance, if [`init`] has succeeded.
pub fn global() -> Option<&'static ActivityLog> {
    GLOBAL.get()
}

/// Shut down the process-wide instance, if any.
pub async fn shutdown() {
    if let Some(log) = GLOBAL.get() {
        log.shutdown().await;
    }
}

fn global_or_warn() -> Option<&'static ActivityLog> {
    let log = GLOBAL.get();
    if log.is_none() {
        warn!("Activity log used before initialization; event dropped");
    }
    log
}

/// Record a login attempt through the process-wide instance.
pub async fn log_login(
    ctx: &RequestContext,
    user_id: Option<i64>,
    email: &str,
    role: Option<&str>,
    status: &str,
    ip_addr: &str,
) -> bool {
    match global_or_warn() {
        Some(log) => log.log_login(ctx, user_id, email, role, status, ip_addr).await,
        None => false,
    }
}

/// Record a logout through the process-wide instance.
pub async fn log_logout(
    ctx: &RequestContext,
    user_id: Option<i64>,
    email: &str,
    role: Option<&str>,
) -> bool {
    match global_or_warn() {
        Some(log) => log.log_logout(ctx, user_id, email, role).await,
        None => false,
    }
}

/// Record a user action through the process-wide instance.
pub async fn log_action(
    ctx: &RequestContext,
    user_id: Option<i64>,
    email: &str,
    role: &str,
    action_type: &str,
    extra: Document,
) -> bool {
    match global_or_warn() {
        Some(log) => {
            log.log_action(ctx, user_id, email, role, action_type, extra)
                .await
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_store_closed_when_scheduler_fails_to_start() {
        // Client construction is lazy; nothing listens on port 1.
        let client = mongodb::Client::with_uri_str("mongodb://127.0.0.1:1")
            .await
            .unwrap();
        let store = Arc::new(MongoLogStore::from_client(
            client,
            "activity_test",
            std::time::Duration::from_secs(1),
        ));
        let scheduler =
            RetentionScheduler::new(store.clone(), 90).with_schedule("not a cron line");

        let err = ActivityLog::with_scheduler(store.clone(), scheduler)
            .await
            .err()
            .expect("start must fail");

        assert!(matches!(err, ActivityLogError::Scheduler(_)));
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_entry_points_without_init_return_false() {
        // No test in this crate's unit suite initializes the global.
        let ctx = RequestContext::detached();
        assert!(global().is_none());
        assert!(!log_login(&ctx, None, "a@b.com", None, "failed", "127.0.0.1").await);
        assert!(!log_logout(&ctx, Some(1), "a@b.com", Some("customer")).await);
        assert!(!log_action(&ctx, Some(1), "a@b.com", "customer", "view", doc! {}).await);
        shutdown().await;
    }
}
