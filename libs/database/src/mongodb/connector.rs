use mongodb::bson::doc;
use mongodb::{Client, options::ClientOptions};
use tracing::{info, instrument};

use super::MongoConfig;

/// Error type for MongoDB connection setup
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Invalid MongoDB configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Build client options from a [`MongoConfig`].
///
/// The socket timeout has no driver-level equivalent; callers enforce it per
/// operation.
pub(crate) async fn client_options(config: &MongoConfig) -> Result<ClientOptions, MongoError> {
    if config.url.trim().is_empty() {
        return Err(MongoError::InvalidConfig("connection URL is empty".to_string()));
    }

    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.server_selection_timeout);

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(options)
}

/// Connect using a [`MongoConfig`] and verify the server answers a ping.
///
/// Fails within roughly `server_selection_timeout` when the server is
/// unreachable.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Connecting to MongoDB");

    let options = client_options(config).await?;
    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}
