//! Tenant scope inspection CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use carescope_core::config::ScopeConfig;
use carescope_core::error::AppError;
use carescope_core::types::predicate::Predicate;
use carescope_core::types::tenant::TenantLevel;
use carescope_database::sql::render_where;
use carescope_tenant::scope::{ScopeDescriptor, ScopePredicateBuilder, ScopeRegistry};
use carescope_tenant::{TenantClaims, TenantContext};

use super::Cli;
use crate::output::{self, OutputFormat};

/// Arguments for scope commands
#[derive(Debug, Args)]
pub struct ScopeArgs {
    /// Scope subcommand
    #[command(subcommand)]
    pub command: ScopeCommand,
}

/// Scope subcommands
#[derive(Debug, Subcommand)]
pub enum ScopeCommand {
    /// List every scoped record type with its resolved tenant paths
    Describe,
    /// Show the filter a caller would get on one record type
    Explain {
        /// Entity or table name, case-insensitive
        #[arg(long)]
        entity: String,
        /// JSON file with the caller's tenant claims
        #[arg(long)]
        context: String,
    },
}

/// One line of `scope describe`.
#[derive(Debug, Serialize, Tabled)]
pub struct DescriptorRow {
    #[tabled(rename = "Entity")]
    pub entity: &'static str,
    #[tabled(rename = "Table")]
    pub table: &'static str,
    #[tabled(rename = "Organization")]
    pub organization: String,
    #[tabled(rename = "Hospital")]
    pub hospital: String,
    #[tabled(rename = "Department")]
    pub department: String,
}

impl From<&ScopeDescriptor> for DescriptorRow {
    fn from(desc: &ScopeDescriptor) -> Self {
        Self {
            entity: desc.entity,
            table: desc.table,
            organization: desc.organization.to_string(),
            hospital: desc.hospital.to_string(),
            department: desc.department.to_string(),
        }
    }
}

/// Result of `scope explain`.
#[derive(Debug, Serialize)]
pub struct Explanation {
    pub entity: &'static str,
    pub table: &'static str,
    pub predicate: Predicate,
    pub sql: String,
    /// Identifiers written into unset fields on create, per level.
    pub stamped: Vec<(TenantLevel, Option<String>)>,
}

/// Execute scope commands
pub async fn execute(args: &ScopeArgs, cli: &Cli) -> Result<(), AppError> {
    let registry = super::registry()?;

    match &args.command {
        ScopeCommand::Describe => {
            let rows: Vec<DescriptorRow> = registry
                .descriptors()
                .into_iter()
                .map(DescriptorRow::from)
                .collect();
            output::print_list(&rows, cli.format);
        }
        ScopeCommand::Explain { entity, context } => {
            let config = cli.load_config().map(|c| c.scope).unwrap_or_default();
            let raw = tokio::fs::read_to_string(context).await.map_err(|e| {
                AppError::validation(format!("Cannot read context file '{context}': {e}"))
            })?;
            let ctx = TenantClaims::from_json(&raw)?.into_context(config.enforce_active_membership)?;

            let explanation = explain(&registry, &config, entity, &ctx)?;
            print_explanation(&explanation, &ctx, cli.format);
        }
    }

    Ok(())
}

/// Build the scope predicate for `entity` under `ctx`, with its SQL form.
pub fn explain(
    registry: &std::sync::Arc<ScopeRegistry>,
    config: &ScopeConfig,
    entity: &str,
    ctx: &TenantContext,
) -> Result<Explanation, AppError> {
    let desc = registry.find_by_name(entity).ok_or_else(|| {
        let known: Vec<&str> = registry.descriptors().iter().map(|d| d.entity).collect();
        AppError::validation(format!(
            "'{entity}' is not a scoped record type (known: {})",
            known.join(", ")
        ))
    })?;

    let builder = ScopePredicateBuilder::new(registry.clone(), config.tables.clone());
    let predicate = builder.build_for(desc, ctx);
    let sql = format!("SELECT * FROM {} WHERE {}", desc.table, render_where(&predicate)?);

    let ids = ctx.stamp_ids();
    let stamped = TenantLevel::ALL
        .into_iter()
        .filter(|level| desc.stamps(*level))
        .map(|level| (level, ids.get(level).map(|id| id.to_string())))
        .collect();

    Ok(Explanation {
        entity: desc.entity,
        table: desc.table,
        predicate,
        sql,
        stamped,
    })
}

fn print_explanation(explanation: &Explanation, ctx: &TenantContext, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(explanation, "{}");
        return;
    }

    output::print_kv("Entity", explanation.entity);
    output::print_kv("Table", explanation.table);
    output::print_kv(
        "Principal",
        ctx.principal_name().unwrap_or("(anonymous)"),
    );
    output::print_kv("Predicate", &explanation.predicate.to_string());
    output::print_kv("SQL", &explanation.sql);
    for (level, id) in &explanation.stamped {
        output::print_kv(
            &format!("Stamps {level}"),
            id.as_deref().unwrap_or("(left unset)"),
        );
    }

    if explanation.predicate.is_never() {
        output::print_warning("This context grants no rows of this type");
    } else if explanation.predicate.is_always() {
        output::print_warning("Tenant filter bypassed");
    }
}
