use core_config::{ConfigError, FromEnv, env_parse_or};
use database::mongodb::MongoConfig;

/// Days an event is kept before the scheduled purge removes it.
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Horizon of the store-level TTL index, a backstop behind the purge.
pub const TTL_DAYS: u64 = 100;

/// Purge trigger: every day at 03:00 UTC (sec min hour dom month dow).
pub const PURGE_SCHEDULE: &str = "0 0 3 * * *";

/// Activity log configuration
///
/// Environment variables:
/// - everything [`MongoConfig`] reads (`MONGODB_URI` is required)
/// - `ACTIVITY_LOG_RETENTION_DAYS` (optional, default: 90, must be >= 1)
#[derive(Clone, Debug)]
pub struct ActivityLogConfig {
    pub mongo: MongoConfig,
    pub retention_days: u32,
}

impl ActivityLogConfig {
    pub fn new(mongo: MongoConfig) -> Self {
        Self {
            mongo,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    pub fn with_retention_days(mut self, retention_days: u32) -> Self {
        self.retention_days = retention_days;
        self
    }

    /// Reject settings the purge cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_retention_days(self.retention_days)
    }
}

/// A zero-day window would put the cutoff at now and empty both collections.
pub(crate) fn validate_retention_days(retention_days: u32) -> Result<(), ConfigError> {
    if retention_days == 0 {
        return Err(ConfigError::ParseError {
            key: "ACTIVITY_LOG_RETENTION_DAYS".to_string(),
            details: "retention must be at least 1 day".to_string(),
        });
    }
    Ok(())
}

impl FromEnv for ActivityLogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            mongo: MongoConfig::from_env()?,
            retention_days: env_parse_or("ACTIVITY_LOG_RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ActivityLogConfig::new(MongoConfig::new("mongodb://localhost:27017"));
        assert_eq!(config.retention_days, 90);
        assert_eq!(config.mongo.database(), "library_analytics");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://logs:27017")),
                ("MONGODB_DB", Some("shop_analytics")),
                ("ACTIVITY_LOG_RETENTION_DAYS", Some("30")),
            ],
            || {
                let config = ActivityLogConfig::from_env().unwrap();
                assert_eq!(config.mongo.url(), "mongodb://logs:27017");
                assert_eq!(config.mongo.database(), "shop_analytics");
                assert_eq!(config.retention_days, 30);
            },
        );
    }

    #[test]
    fn test_from_env_requires_uri() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", None::<&str>),
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None::<&str>),
            ],
            || {
                let err = ActivityLogConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(_)));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_zero_retention() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://logs:27017")),
                ("ACTIVITY_LOG_RETENTION_DAYS", Some("0")),
            ],
            || {
                assert!(ActivityLogConfig::from_env().is_err());
            },
        );
    }
}
