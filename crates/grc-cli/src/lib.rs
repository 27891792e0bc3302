//! # grc-cli
//!
//! Command-line front end over the entity repositories: list, inspect
//! and edit records of every GRC entity, print dashboard summaries and
//! run migrations.

pub mod commands;
pub mod output;

pub use commands::Cli;
pub use output::OutputFormat;
