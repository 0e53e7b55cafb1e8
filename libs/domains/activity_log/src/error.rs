//! Activity log error types

use core_config::ConfigError;
use database::mongodb::MongoError;
use std::time::Duration;
use tokio_cron_scheduler::JobSchedulerError;

/// Result type for activity log operations
pub type Result<T> = std::result::Result<T, ActivityLogError>;

/// Failures inside the subsystem.
///
/// Public recording entry points collapse these to `false`; only init
/// returns them to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ActivityLogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection failed: {0}")]
    Connection(#[from] MongoError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("BSON serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    #[error("Activity log store is closed")]
    Closed,

    #[error("Activity log is not initialized")]
    NotInitialized,
}

impl ActivityLogError {
    /// Whether the failure came from the storage layer rather than setup.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Timeout { .. } | Self::Closed | Self::Connection(_)
        )
    }
}
