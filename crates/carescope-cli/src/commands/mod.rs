//! CLI command definitions and dispatch.

pub mod config;
pub mod db;
pub mod scope;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use carescope_core::config::AppConfig;
use carescope_core::error::AppError;
use carescope_tenant::scope::ScopeRegistry;

use crate::output::OutputFormat;

/// CareScope: tenant scope enforcement for clinical records
#[derive(Debug, Parser)]
#[command(name = "carescope", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/<env>`
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Configuration management
    Config(config::ConfigArgs),
    /// Inspect tenant scope registration and predicates
    Scope(scope::ScopeArgs),
    /// Database connectivity
    Db(db::DbArgs),
}

impl Cli {
    /// Install the tracing subscriber from configuration, falling back to
    /// defaults when the configuration cannot be loaded.
    pub fn init_logging(&self) {
        let logging = self.load_config().map(|c| c.logging).unwrap_or_default();
        carescope_core::logging::init(&logging);
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Config(args) => config::execute(args, self),
            Commands::Scope(args) => scope::execute(args, self).await,
            Commands::Db(args) => db::execute(args, self).await,
        }
    }

    /// Load configuration from the selected file and overlay.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, self.env.as_deref())
    }
}

/// Registry of every tenant-scoped clinical record type.
pub fn registry() -> Result<Arc<ScopeRegistry>, AppError> {
    Ok(Arc::new(carescope_entity::clinical_registry()?))
}
