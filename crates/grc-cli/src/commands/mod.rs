//! CLI command definitions and dispatch.

pub mod config;
pub mod metrics;
pub mod migrate;
pub mod records;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use grc_core::config::AppConfig;
use grc_core::error::AppError;
use grc_service::Repositories;

/// GRC administration: incidents, vulnerabilities, policies, controls and
/// compliance records
#[derive(Debug, Parser)]
#[command(name = "grc-admin", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}.toml`
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
    /// List, inspect and edit records
    #[command(flatten)]
    Records(records::RecordCommand),
    /// Dashboard summaries
    Metrics(metrics::MetricsArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load the configuration this invocation points at.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, self.env.as_deref())
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Records(command) => records::execute(command, config, self.format).await,
            Commands::Metrics(args) => metrics::execute(args, config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Config(args) => config::execute(args, &self.config, config, self.format),
        }
    }
}

/// Helper: connect the configured backend and build every repository
pub async fn connect_repositories(config: &AppConfig) -> Result<Repositories, AppError> {
    let backend = grc_database::connect_backend(config).await?;
    Ok(Repositories::new(backend, &config.query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_parse() {
        let cli = Cli::try_parse_from([
            "grc-admin", "-c", "config/test.toml", "-f", "json", "get", "incident",
            "6f1c2a44-2f0e-4c38-9d7a-6f8f0c1b2a33",
        ])
        .unwrap();
        assert_eq!(cli.config, "config/test.toml");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Records(_)));
    }
}
