//! Configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::time::Duration;

use crate::db::TransactionOptions;
use crate::geo::DEFAULT_LOCATION_FIELD;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project the database handle is opened for
    pub project_id: String,
    /// Field holding each document's GeoPoint
    pub location_field: String,
    /// Attempts per transaction, including the first
    pub max_transaction_attempts: u32,
    /// Delay before the first transaction retry (milliseconds)
    pub initial_backoff_ms: u64,
    /// Upper bound on the retry delay (milliseconds)
    pub max_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: "local-dev".to_string(),
            location_field: DEFAULT_LOCATION_FIELD.to_string(),
            max_transaction_attempts: 5,
            initial_backoff_ms: 5,
            max_backoff_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            project_id: env::var("GEOFIRESTORE_PROJECT_ID").unwrap_or(defaults.project_id),
            location_field: env::var("GEOFIRESTORE_LOCATION_FIELD")
                .unwrap_or(defaults.location_field),
            max_transaction_attempts: parse_var(
                "GEOFIRESTORE_MAX_ATTEMPTS",
                defaults.max_transaction_attempts,
            )?,
            initial_backoff_ms: parse_var(
                "GEOFIRESTORE_INITIAL_BACKOFF_MS",
                defaults.initial_backoff_ms,
            )?,
            max_backoff_ms: parse_var("GEOFIRESTORE_MAX_BACKOFF_MS", defaults.max_backoff_ms)?,
        })
    }

    /// Transaction retry options described by this configuration.
    pub fn transaction_options(&self) -> Result<TransactionOptions, ConfigError> {
        TransactionOptions::new()
            .with_max_attempts(self.max_transaction_attempts)
            .map_err(|_| ConfigError::Invalid {
                name: "GEOFIRESTORE_MAX_ATTEMPTS",
                value: self.max_transaction_attempts.to_string(),
            })
            .map(|options| {
                options.with_backoff(
                    Duration::from_millis(self.initial_backoff_ms),
                    Duration::from_millis(self.max_backoff_ms),
                )
            })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("GEOFIRESTORE_PROJECT_ID", "test-project");
        env::set_var("GEOFIRESTORE_MAX_ATTEMPTS", "7");
        env::remove_var("GEOFIRESTORE_INITIAL_BACKOFF_MS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.project_id, "test-project");
        assert_eq!(config.max_transaction_attempts, 7);
        assert_eq!(config.initial_backoff_ms, 5);

        let options = config.transaction_options().unwrap();
        assert_eq!(options.max_attempts(), 7);

        env::set_var("GEOFIRESTORE_MAX_ATTEMPTS", "many");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                name: "GEOFIRESTORE_MAX_ATTEMPTS",
                ..
            })
        ));
        env::remove_var("GEOFIRESTORE_MAX_ATTEMPTS");
    }

    #[test]
    fn test_zero_attempts_is_invalid() {
        let config = Config {
            max_transaction_attempts: 0,
            ..Config::default()
        };
        assert!(config.transaction_options().is_err());
    }
}
