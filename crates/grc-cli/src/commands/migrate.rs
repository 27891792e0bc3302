//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use grc_core::config::{AppConfig, BackendKind};
use grc_core::error::AppError;
use grc_database::DatabasePool;
use grc_entity::{
    Assessment, ComplianceFramework, Control, ControlMapping, Entity, Incident, Policy,
    Requirement, Vulnerability,
};

/// Every table the record commands read and write.
const ENTITY_TABLES: &[&str] = &[
    Incident::TABLE,
    Vulnerability::TABLE,
    Policy::TABLE,
    Control::TABLE,
    ComplianceFramework::TABLE,
    Requirement::TABLE,
    ControlMapping::TABLE,
    Assessment::TABLE,
];

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that every entity table exists
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if config.backend.kind != BackendKind::Postgres {
        return Err(AppError::configuration(
            "Migrations apply only to the postgres backend",
        ));
    }
    let pool = DatabasePool::connect(&config.database, None).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            grc_database::migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            let missing = pool.missing_tables(ENTITY_TABLES).await?;
            if missing.is_empty() {
                output::print_success("All entity tables are present.");
            } else {
                output::print_warning(&format!("Missing tables: {}", missing.join(", ")));
            }
        }
    }

    pool.close().await;
    Ok(())
}
