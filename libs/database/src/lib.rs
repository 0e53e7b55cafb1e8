//! Database connectors shared by the workspace.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client construction with bounded timeouts
//! - `config` - `core_config::FromEnv` support for [`mongodb::MongoConfig`]
//!
//! ## MongoDB
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "library_analytics");
//! let client = mongodb::connect_from_config(&config).await?;
//! let db = client.database(config.database());
//! ```

#[cfg(feature = "mongodb")]
pub mod mongodb;
