//! Activity Log Domain
//!
//! Records authentication and user-action events to MongoDB and keeps them
//! for a bounded window:
//! - every event is enriched with client IP, method, path and user agent
//! - recording never fails the caller; storage errors become `false`
//! - a TTL index (100 days) and a daily 03:00 UTC purge (90 days by
//!   default) bound retention
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  auth / action handlers                                      │
//! │        │ log_login / log_logout / log_action                 │
//! │        ▼                                                     │
//! │  ActivityLog ──► EventRecorder ──┐                           │
//! │        │                         ├──► MongoLogStore ──► Mongo │
//! │        └──────► RetentionScheduler┘     login_events          │
//! │                 (cron 0 0 3 * * *)      action_events         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use domain_activity_log::{ActivityLog, ActivityLogConfig, RequestContext};
//! use mongodb::bson::doc;
//!
//! let log = ActivityLog::init(&ActivityLogConfig::from_env()?).await?;
//! let ctx = RequestContext::new("203.0.113.7", "POST", "/cart");
//! log.log_action(&ctx, Some(7), "reader@example.com", "customer", "add_to_cart", doc! { "book_id": 12 })
//!     .await;
//! log.shutdown().await;
//! ```

mod config;
mod context;
mod error;
mod models;
mod mongo_store;
mod recorder;
mod retention;
pub mod sanitize;
mod service;
mod store;

pub use config::{ActivityLogConfig, DEFAULT_RETENTION_DAYS, PURGE_SCHEDULE, TTL_DAYS};
pub use context::RequestContext;
pub use error::{ActivityLogError, Result};
pub use models::{HttpMetadata, LOGIN_EVENT, LOGOUT_EVENT, LogCollection, LogEvent, PurgeReport};
pub use mongo_store::{ACTION_TYPE_INDEX, LOGIN_USER_INDEX, MongoLogStore, TTL_INDEX};
pub use recorder::EventRecorder;
pub use retention::{RetentionScheduler, purge_expired};
pub use service::{ActivityLog, global, init, log_action, log_login, log_logout, shutdown};
pub use store::LogEventStore;
