//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that runs a MongoDB container for testing.

use database::mongodb::MongoConfig;
use mongodb::{Client, Database};
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let db = mongo.database("activity_test");
/// # }
/// ```
pub struct TestMongo {
    container: ContainerAsync<Mongo>,
    client: Client,
    pub connection_string: String,
}

impl TestMongo {
    /// Start a MongoDB 8 container and connect to it.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("8.0")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}/?directConnection=true", host_port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        tracing::info!(port = host_port, "Test MongoDB ready (mongo 8.0)");

        Self {
            container,
            client,
            connection_string,
        }
    }

    /// A database handle on a client independent of the code under test
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Connection config pointing at this container with short timeouts.
    pub fn config(&self, database: &str) -> MongoConfig {
        MongoConfig::with_database(self.connection_string.clone(), database)
            .with_app_name("test-utils")
            .with_timeouts(
                Duration::from_secs(2),
                Duration::from_secs(2),
                Duration::from_secs(2),
            )
    }

    /// Stop the container while keeping the handle, simulating an outage.
    pub async fn stop(&self) {
        self.container
            .stop()
            .await
            .expect("Failed to stop MongoDB container");
    }
}

// Container is automatically cleaned up when TestMongo is dropped
impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}
