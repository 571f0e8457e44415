//! Database connectivity for the shop services.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client configuration, connect-with-retry, health
//! - `config` - load [`mongodb::MongoConfig`] through `core_config::FromEnv`
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "shop");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{RetryConfig, retry, retry_with_backoff};
