//! Dashboard summary commands.

use clap::{Args, ValueEnum};

use crate::output::{self, OutputFormat};
use grc_core::config::AppConfig;
use grc_core::error::AppError;
use grc_service::Dashboard;

/// Arguments for the metrics command
#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Dashboard card to compute
    #[arg(value_enum)]
    pub card: Card,
}

/// Dashboard cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Card {
    /// Vulnerability management
    Vulnerabilities,
    /// Incident response
    Incidents,
    /// Compliance posture
    Compliance,
    /// Policy lifecycle
    Policies,
    /// Control effectiveness
    Controls,
    /// Assessment schedule
    Assessments,
}

/// Execute metrics commands
pub async fn execute(
    args: &MetricsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let dashboard = Dashboard::new(super::connect_repositories(config).await?);

    match args.card {
        Card::Vulnerabilities => output::print_item(&dashboard.vulnerabilities().await?, format),
        Card::Incidents => output::print_item(&dashboard.incidents().await?, format),
        Card::Compliance => output::print_item(&dashboard.compliance().await?, format),
        Card::Policies => output::print_item(&dashboard.policies().await?, format),
        Card::Controls => output::print_item(&dashboard.controls().await?, format),
        Card::Assessments => output::print_item(&dashboard.assessments().await?, format),
    }

    Ok(())
}
