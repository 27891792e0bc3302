//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use grc_core::config::AppConfig;
use grc_core::error::AppError;
use grc_database::mask_password;

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
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate the configuration file
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => output::print_item(&redacted(config), format),
        ConfigCommand::Validate => {
            config.validate()?;
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Backend", &format!("{:?}", config.backend.kind));
            output::print_kv("Database", &mask_password(&config.database.url));
            output::print_kv("Max page size", &config.query.max_page_size.to_string());
            output::print_kv(
                "Request timeout",
                &format!("{} ms", config.query.request_timeout_ms),
            );
        }
    }

    Ok(())
}

/// Copy of `config` safe to print.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    shown.database.url = mask_password(&shown.database.url);
    if !shown.rest.api_key.is_empty() {
        shown.rest.api_key = "****".to_string();
    }
    shown
}
