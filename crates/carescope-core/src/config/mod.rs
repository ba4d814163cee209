//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `CARESCOPE__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod database;
pub mod logging;
pub mod scope;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::scope::{ScopeConfig, TenantTables};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration sources
/// (base file + environment overlay + environment variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tenant scope enforcement settings.
    #[serde(default)]
    pub scope: ScopeConfig,
}

impl AppConfig {
    /// Load configuration from `path`, an optional `config/{env}` overlay,
    /// and environment variables prefixed with `CARESCOPE__`.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CARESCOPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config = config::Config::builder()
            .set_override("database.url", "postgres://localhost/carescope")
            .expect("override")
            .build()
            .expect("build");
        let parsed: AppConfig = config.try_deserialize().expect("deserialize");

        assert_eq!(parsed.database.pool_size, 8);
        assert_eq!(parsed.logging.level, "info");
        assert!(parsed.scope.enforce_active_membership);
        assert_eq!(parsed.scope.tables.hospitals, "hospitals");
    }
}
