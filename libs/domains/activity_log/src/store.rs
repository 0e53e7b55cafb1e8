//! Storage seam shared by the recorder and the retention job

use crate::error::Result;
use crate::models::{LogCollection, LogEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Write/delete access to the event collections.
///
/// There is no `close` here; only the lifecycle owner tears the store down.
#[async_trait]
pub trait LogEventStore: Send + Sync {
    /// Insert one event into `collection`
    async fn insert(&self, collection: LogCollection, event: &LogEvent) -> Result<()>;

    /// Delete every event in `collection` with `timestamp < cutoff`
    async fn delete_before(&self, collection: LogCollection, cutoff: DateTime<Utc>) -> Result<u64>;
}
