use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};

/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "library_analytics";

/// MongoDB connection settings.
///
/// Timeouts default to fail-fast values (3s connect, 5s socket, 5s server
/// selection) so an outage surfaces as an error instead of a hung caller.
///
/// # Example
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::new("mongodb://localhost:27017");
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "mydb")
///     .with_app_name("activity-log");
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// MongoDB connection URL (required)
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,

    /// Database name to use
    pub database: String,

    /// Optional application name for server logs
    pub app_name: Option<String>,

    /// Maximum number of connections in the pool
    pub max_pool_size: u32,

    /// Minimum number of connections in the pool
    pub min_pool_size: u32,

    /// Time allowed to establish a TCP connection
    pub connect_timeout: Duration,

    /// Upper bound for a single read or write round trip
    pub socket_timeout: Duration,

    /// Time allowed to find a suitable server before an operation fails
    pub server_selection_timeout: Duration,
}

impl MongoConfig {
    /// Create a config for `url` using the default database.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_database(url, DEFAULT_DATABASE)
    }

    /// Create a config with a specific database name.
    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Set the application name for server logs
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Override all three timeouts at once.
    pub fn with_timeouts(mut self, connect: Duration, socket: Duration, selection: Duration) -> Self {
        self.connect_timeout = connect;
        self.socket_timeout = socket;
        self.server_selection_timeout = selection;
        self
    }

    /// Get a reference to the MongoDB URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout: Duration::from_secs(3),
            socket_timeout: Duration::from_secs(5),
            server_selection_timeout: Duration::from_secs(5),
        }
    }
}

/// Load MongoConfig from environment variables
///
/// Environment variables:
/// - `MONGODB_URI`, `MONGODB_URL` or `MONGO_URL` (required) - connection string
/// - `MONGODB_DB` or `MONGODB_DATABASE` (optional, default: `library_analytics`)
/// - `MONGODB_APP_NAME` (optional) - Application name for server logs
/// - `MONGODB_MAX_POOL_SIZE` (optional, default: 100)
/// - `MONGODB_MIN_POOL_SIZE` (optional, default: 5)
/// - `MONGODB_CONNECT_TIMEOUT_MS` (optional, default: 3000)
/// - `MONGODB_SOCKET_TIMEOUT_MS` (optional, default: 5000)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_MS` (optional, default: 5000)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = ["MONGODB_URI", "MONGODB_URL", "MONGO_URL"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| ConfigError::MissingEnvVar("MONGODB_URI".to_string()))?;

        let database = env_or_default(
            "MONGODB_DB",
            &env_or_default("MONGODB_DATABASE", DEFAULT_DATABASE),
        );

        let defaults = Self::default();

        Ok(Self {
            url,
            database,
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout: Duration::from_millis(env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_MS",
                3_000u64,
            )?),
            socket_timeout: Duration::from_millis(env_parse_or(
                "MONGODB_SOCKET_TIMEOUT_MS",
                5_000u64,
            )?),
            server_selection_timeout: Duration::from_millis(env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_MS",
                5_000u64,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mongo_config_new_uses_default_database() {
        let config = MongoConfig::new("mongodb://localhost:27017");
        assert_eq!(config.url(), "mongodb://localhost:27017");
        assert_eq!(config.database(), "library_analytics");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.socket_timeout, Duration::from_secs(5));
        assert_eq!(config.server_selection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_mongo_config_builders() {
        let config = MongoConfig::with_database("mongodb://db:27017", "audit")
            .with_app_name("activity-log")
            .with_timeouts(
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
            );
        assert_eq!(config.database(), "audit");
        assert_eq!(config.app_name.as_deref(), Some("activity-log"));
        assert_eq!(config.socket_timeout, Duration::from_millis(200));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://localhost:27017")),
                ("MONGODB_DB", None::<&str>),
                ("MONGODB_DATABASE", None::<&str>),
                ("MONGODB_SOCKET_TIMEOUT_MS", Some("1500")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://localhost:27017");
                assert_eq!(config.database, "library_analytics");
                assert_eq!(config.socket_timeout, Duration::from_millis(1500));
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_fallback() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", None::<&str>),
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", Some("mongodb://fallback:27017")),
                ("MONGODB_DB", Some("analytics")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://fallback:27017");
                assert_eq!(config.database, "analytics");
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_database_alias() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://localhost:27017")),
                ("MONGODB_DB", None::<&str>),
                ("MONGODB_DATABASE", Some("legacy_name")),
            ],
            || {
                assert_eq!(MongoConfig::from_env().unwrap().database, "legacy_name");
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_missing_url() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", None::<&str>),
                ("MONGODB_URL", Some("   ")),
                ("MONGO_URL", None::<&str>),
            ],
            || {
                let err = MongoConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_URI"));
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_bad_timeout() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://localhost:27017")),
                ("MONGODB_CONNECT_TIMEOUT_MS", Some("soon")),
            ],
            || {
                assert!(MongoConfig::from_env().is_err());
            },
        );
    }
}
