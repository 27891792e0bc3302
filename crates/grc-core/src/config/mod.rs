//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section has defaults so a missing file still yields a
//! usable configuration.

pub mod backend;
pub mod database;
pub mod logging;
pub mod query;

use serde::{Deserialize, Serialize};

pub use self::backend::{BackendConfig, BackendKind, RestConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::query::{PAGE_SIZE_CEILING, QueryConfig};

use crate::error::AppError;

/// Prefix for environment variable overrides (`GRC__QUERY__MAX_PAGE_SIZE=50`).
const ENV_PREFIX: &str = "GRC";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: BackendConfig,
    /// PostgreSQL connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Hosted table API settings.
    #[serde(default)]
    pub rest: RestConfig,
    /// Page-size and timeout bounds.
    #[serde(default)]
    pub query: QueryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges the base file with an optional environment-specific overlay
    /// (`config/{env}.toml`) and environment variables prefixed with `GRC__`.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings no request could be served with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.query.max_page_size == 0 || self.query.max_page_size > PAGE_SIZE_CEILING {
            return Err(AppError::configuration(format!(
                "query.max_page_size must be within 1..={PAGE_SIZE_CEILING}"
            )));
        }
        if self.query.default_page_size == 0 || self.query.default_page_size > self.query.max_page_size {
            return Err(AppError::configuration(format!(
                "query.default_page_size must be within 1..={}",
                self.query.max_page_size
            )));
        }
        if self.query.request_timeout_ms == 0 {
            return Err(AppError::configuration("query.request_timeout_ms must be positive"));
        }
        if self.backend.kind == BackendKind::Rest && self.rest.base_url.is_empty() {
            return Err(AppError::configuration("rest.base_url is required for the rest backend"));
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
        assert_eq!(config.query.max_page_size, 200);
        assert_eq!(config.query.default_page_size, 25);
        assert_eq!(config.backend.kind, BackendKind::Postgres);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist", None).expect("defaults");
        assert_eq!(config.rest.schema, "public");
    }

    #[test]
    fn test_rest_backend_requires_base_url() {
        let mut config = AppConfig::default();
        config.backend.kind = BackendKind::Rest;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_max_page_size_has_a_ceiling() {
        let mut config = AppConfig::default();
        config.query.max_page_size = PAGE_SIZE_CEILING + 1;
        config.query.default_page_size = 25;
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("1..=200"));

        config.query.max_page_size = PAGE_SIZE_CEILING;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_page_size_bounded_by_max() {
        let mut config = AppConfig::default();
        config.query.default_page_size = 500;
        assert!(config.validate().is_err());
    }
}
