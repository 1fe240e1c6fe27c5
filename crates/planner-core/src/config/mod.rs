//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod planner;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, RateLimitConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseBackend, DatabaseConfig};
pub use self::logging::LoggingConfig;
pub use self::planner::PlannerConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides, e.g. `PLANNER__SERVER__PORT`.
pub const ENV_PREFIX: &str = "PLANNER";

/// Upper bound on the configurable lease duration (one day).
const MAX_LEASE_MINUTES: u64 = 24 * 60;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration
/// (default.toml, then the environment overlay, then env vars).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token verification and key refresh settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Domain limits: lease duration, collection ceilings, invitation ttl.
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `{config_dir}/default`, `{config_dir}/{env}`
    /// and `PLANNER__*` environment variables, later sources winning.
    pub fn load(config_dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{config_dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the server unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_LEASE_MINUTES).contains(&self.planner.lease_duration_minutes) {
            return Err(AppError::configuration(format!(
                "planner.lease_duration_minutes must be between 1 and {MAX_LEASE_MINUTES}"
            )));
        }
        if !(1..=365).contains(&self.planner.invitation_ttl_days) {
            return Err(AppError::configuration(
                "planner.invitation_ttl_days must be between 1 and 365",
            ));
        }
        if self.planner.max_items_per_collection == 0 {
            return Err(AppError::configuration(
                "planner.max_items_per_collection must be positive",
            ));
        }
        if self.auth.key_refresh_interval_seconds == 0 {
            return Err(AppError::configuration(
                "auth.key_refresh_interval_seconds must be positive",
            ));
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.planner.lease_duration_minutes, 15);
        assert_eq!(config.planner.max_items_per_collection, 500);
        assert_eq!(config.auth.key_refresh_interval_seconds, 3600);
    }

    #[test]
    fn test_zero_lease_duration_rejected() {
        let mut config = AppConfig::default();
        config.planner.lease_duration_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load("does-not-exist", "test").expect("defaults load");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.auth.public_key_path, "/api/public-key");
    }
}
