//! MongoDB implementation of LogEventStore

use crate::config::TTL_DAYS;
use crate::error::{ActivityLogError, Result};
use crate::models::{LogCollection, LogEvent, to_bson_datetime};
use crate::store::LogEventStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::{HealthStatus, MongoConfig, check_health_detailed, connect_from_config};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Index names, fixed so repeated setup matches the existing indexes.
pub const LOGIN_USER_INDEX: &str = "user_id_timestamp";
pub const ACTION_TYPE_INDEX: &str = "event_type_timestamp";
pub const TTL_INDEX: &str = "timestamp_ttl";

/// The process-wide connection to the event database.
///
/// Owns one pooled `Client`; share it behind an `Arc`. Every operation is
/// bounded by the configured socket timeout.
pub struct MongoLogStore {
    client: Client,
    database: Database,
    op_timeout: Duration,
    closed: AtomicBool,
}

impl MongoLogStore {
    /// Connect and verify the server is reachable.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = connect_from_config(config).await?;
        Ok(Self::from_client(client, config.database(), config.socket_timeout))
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client, database: &str, op_timeout: Duration) -> Self {
        let database = client.database(database);
        Self {
            client,
            database,
            op_timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn collection(&self, collection: LogCollection) -> Collection<LogEvent> {
        self.database.collection(collection.name())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn index_models(collection: LogCollection) -> Vec<IndexModel> {
        let (name, keys) = match collection {
            LogCollection::LoginEvents => (LOGIN_USER_INDEX, doc! { "user_id": -1, "timestamp": -1 }),
            LogCollection::ActionEvents => {
                (ACTION_TYPE_INDEX, doc! { "event_type": -1, "timestamp": -1 })
            }
        };

        vec![
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build(),
            // Backstop expiry, independent of the scheduled purge
            IndexModel::builder()
                .keys(doc! { "timestamp": 1 })
                .options(
                    IndexOptions::builder()
                        .name(TTL_INDEX.to_string())
                        .expire_after(Duration::from_secs(TTL_DAYS * 24 * 60 * 60))
                        .build(),
                )
                .build(),
        ]
    }

    /// Create the query and TTL indexes on both collections.
    ///
    /// Re-running against existing identical indexes is a no-op on the server.
    #[instrument(skip_all, fields(database = %self.database.name()))]
    pub async fn ensure_indexes(&self) -> Result<()> {
        for collection in LogCollection::iter() {
            let models = Self::index_models(collection);
            self.bounded("create_indexes", self.collection(collection).create_indexes(models))
                .await?;
            debug!(%collection, "Indexes ensured");
        }
        info!("Activity log indexes ready");
        Ok(())
    }

    /// Ping the server.
    pub async fn health(&self) -> HealthStatus {
        if self.is_closed() {
            return HealthStatus {
                healthy: false,
                message: Some(ActivityLogError::Closed.to_string()),
                response_time_ms: 0,
            };
        }
        check_health_detailed(&self.client).await
    }

    /// Shut the client down. Later calls, and any operation issued after
    /// the first call, are no-ops or fail with [`ActivityLogError::Closed`].
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.client.clone().shutdown().await;
        info!("MongoDB connection closed");
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        if self.is_closed() {
            return Err(ActivityLogError::Closed);
        }

        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(ActivityLogError::from),
            Err(_) => Err(ActivityLogError::Timeout {
                operation,
                timeout: self.op_timeout,
            }),
        }
    }
}

#[async_trait]
impl LogEventStore for MongoLogStore {
    #[instrument(skip_all, fields(%collection, event_type = %event.event_type))]
    async fn insert(&self, collection: LogCollection, event: &LogEvent) -> Result<()> {
        self.bounded("insert_one", self.collection(collection).insert_one(event))
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(%collection, %cutoff))]
    async fn delete_before(&self, collection: LogCollection, cutoff: DateTime<Utc>) -> Result<u64> {
        let filter = doc! { "timestamp": { "$lt": to_bson_datetime(cutoff) } };
        let result = self
            .bounded("delete_many", self.collection(collection).delete_many(filter))
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_models_per_collection() {
        let login = MongoLogStore::index_models(LogCollection::LoginEvents);
        assert_eq!(login.len(), 2);
        assert_eq!(login[0].keys, doc! { "user_id": -1, "timestamp": -1 });

        let action = MongoLogStore::index_models(LogCollection::ActionEvents);
        assert_eq!(action[0].keys, doc! { "event_type": -1, "timestamp": -1 });

        let ttl = action[1].options.as_ref().unwrap();
        assert_eq!(ttl.expire_after, Some(Duration::from_secs(100 * 86_400)));
        assert_eq!(ttl.name.as_deref(), Some(TTL_INDEX));
    }
}
