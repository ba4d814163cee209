//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use carescope_core::error::AppError;

use super::Cli;
use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration, with the database password masked
    Show,
    /// Validate configuration and the scope registry
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = cli.load_config()?;
            config.database.url = config.database.redacted_url();
            match cli.format {
                OutputFormat::Json => output::print_json(&config, "{}"),
                OutputFormat::Table => println!("{config:#?}"),
            }
        }
        ConfigCommand::Validate => {
            let loaded = cli
                .load_config()
                .and_then(|config| config.database.validate().map(|_| config));
            let config = match loaded {
                Ok(config) => config,
                Err(e) => {
                    output::print_error(&format!("Configuration invalid: {}", e.message));
                    return Err(e);
                }
            };
            let registry = super::registry()?;

            output::print_success(&format!("Configuration '{}' is valid", cli.config));
            output::print_kv("Database", &config.database.redacted_url());
            output::print_kv(
                "Pool",
                &format!(
                    "{} connections, {}s timeout",
                    config.database.pool_size, config.database.timeout_seconds
                ),
            );
            output::print_kv(
                "Logging",
                &format!("{} ({})", config.logging.level, config.logging.format),
            );
            output::print_kv(
                "Active membership check",
                if config.scope.enforce_active_membership {
                    "enforced"
                } else {
                    "off"
                },
            );
            output::print_kv(
                "Tenant tables",
                &format!(
                    "{}, {}, {}",
                    config.scope.tables.organizations,
                    config.scope.tables.hospitals,
                    config.scope.tables.departments
                ),
            );
            output::print_kv("Scoped record types", &registry.len().to_string());
        }
    }

    Ok(())
}
