//! Clinical record store settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Where the clinical records live and how many connections CareScope may hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL.
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Upper bound for acquiring a connection, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_pool_size() -> u32 {
    8
}

fn default_timeout() -> u64 {
    5
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The URL with any password replaced by `****`.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((userinfo, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:****@{host}"),
            None => self.url.clone(),
        }
    }

    /// Reject settings the pool cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(AppError::configuration(format!(
                "database.url must be a PostgreSQL URL, got '{}'",
                self.redacted_url()
            )));
        }
        if self.pool_size == 0 {
            return Err(AppError::configuration("database.pool_size must be at least 1"));
        }
        Ok(())
    }
}
