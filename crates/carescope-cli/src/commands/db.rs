//! Database connectivity CLI commands.

use clap::{Args, Subcommand};
use tracing::info;

use carescope_core::error::AppError;
use carescope_database::connection;

use super::Cli;
use crate::output;

/// Arguments for db commands
#[derive(Debug, Args)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

/// Db subcommands
#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Connect to the clinical record store and time a round trip
    Ping,
}

/// Execute db commands
pub async fn execute(args: &DbArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        DbCommand::Ping => {
            let config = cli.load_config()?;
            let pool = connection::connect(&config.database).await?;
            let elapsed = connection::ping(&pool).await;
            pool.close().await;

            let elapsed = elapsed?;
            info!(elapsed_ms = elapsed.as_millis() as u64, "Database reachable");
            output::print_success(&format!(
                "{} answered in {} ms",
                config.database.redacted_url(),
                elapsed.as_millis()
            ));
        }
    }

    Ok(())
}
