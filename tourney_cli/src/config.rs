//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use tourney::db::{DatabaseConfig, parse_env_or};
use tourney::rating::K_FACTOR;
use tourney::tournament::{DEFAULT_CAPACITY, DEFAULT_GROUP_SIZE};

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Confirmed slots for `create` without `--slots`
    pub default_capacity: usize,
    /// Group size for `create` without `--group-size`
    pub default_group_size: usize,
    /// Elo K-factor applied by `report`
    pub k_factor: f64,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// `database_url_override` comes from `--db-url` and wins over `DATABASE_URL`.
    pub fn from_env(database_url_override: Option<String>) -> Self {
        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        Self {
            database,
            default_capacity: parse_env_or("TOURNEY_DEFAULT_SLOTS", DEFAULT_CAPACITY),
            default_group_size: parse_env_or("TOURNEY_DEFAULT_GROUP_SIZE", DEFAULT_GROUP_SIZE),
            k_factor: parse_env_or("TOURNEY_K_FACTOR", K_FACTOR),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_DEFAULT_SLOTS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.default_group_size == 0 {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_DEFAULT_GROUP_SIZE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_K_FACTOR".to_string(),
                reason: format!("Must be a positive number, got {}", self.k_factor),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.database.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
