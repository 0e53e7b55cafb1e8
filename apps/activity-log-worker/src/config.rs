//! Configuration for the activity log worker

use core_config::{Environment, FromEnv};
use domain_activity_log::ActivityLogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub activity_log: ActivityLogConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            activity_log: ActivityLogConfig::from_env()?,
        })
    }
}
