//! Configuration for shopctl

use core_config::{FromEnv, env_parse};
use database::common::RetryConfig;
use database::mongodb::MongoConfig;
use domain_shop::ConsistencyMode;

pub use core_config::Environment;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub mongodb: MongoConfig,
    /// `SHOP_CONSISTENCY_MODE`, `strict` unless set
    pub mode: ConsistencyMode,
    /// `SHOP_CONNECT_RETRIES`
    pub connect_retries: u32,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            mongodb: MongoConfig::from_env()?,
            mode: env_parse("SHOP_CONSISTENCY_MODE", ConsistencyMode::default())?,
            connect_retries: env_parse("SHOP_CONNECT_RETRIES", 3)?,
        })
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::new().with_max_retries(self.connect_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "SHOP_CONSISTENCY_MODE",
                "SHOP_CONNECT_RETRIES",
                "MONGODB_URI",
                "MONGODB_URL",
                "MONGO_URL",
                "MONGODB_DATABASE",
                "MONGO_DATABASE",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.mode, ConsistencyMode::Strict);
                assert_eq!(config.mongodb.database(), "shop");
                assert_eq!(config.retry().max_retries, 3);
            },
        );
    }

    #[test]
    fn test_legacy_mode_from_env() {
        temp_env::with_vars(
            [
                ("SHOP_CONSISTENCY_MODE", Some("Legacy")),
                ("SHOP_CONNECT_RETRIES", Some("0")),
                ("MONGODB_DATABASE", Some("shop_staging")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mode, ConsistencyMode::Legacy);
                assert_eq!(config.connect_retries, 0);
                assert_eq!(config.mongodb.database(), "shop_staging");
            },
        );
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        temp_env::with_var("SHOP_CONSISTENCY_MODE", Some("eventual"), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("SHOP_CONSISTENCY_MODE"));
        });
    }
}
