//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Migrator - apply versioned schema migrations to Postgres
#[derive(Parser, Debug)]
#[command(name = "mg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "MG_CONFIG", default_value = "migrator.yml")]
    pub config: String,

    /// Only use this datasource (default: all, in name order)
    #[arg(short, long, global = true)]
    pub datasource: Option<String>,

    /// Suppress per-statement and progress logging; failures are still logged
    #[arg(short, long, global = true)]
    pub silent: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Run(RunArgs),

    /// Show applied and pending migrations without changing anything
    Status(StatusArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: RunOutput,
}

/// Run output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutput {
    /// Human-readable summary
    Text,
    /// JSON report per datasource
    Json,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
