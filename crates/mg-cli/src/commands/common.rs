//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use mg_core::{Config, DatasourceConfig, Registry, RunMode};
use mg_db::ConnectionSettings;
use mg_engine::Migrator;
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run (connections closed, locks released).
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs maps this to the exit status.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A unit failed or could not be recorded
pub(crate) const EXIT_MIGRATION_FAILED: u8 = 1;

/// Another process holds the run lock
pub(crate) const EXIT_LOCK_DENIED: u8 = 2;

/// Load the config file named by `--config`.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let path = Path::new(&global.config);
    let config = if path.is_dir() {
        Config::load_from_dir(path)
    } else {
        Config::load(path)
    };
    config.with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Datasources selected by `--datasource`, or all of them in name order.
pub(crate) fn selected_datasources<'a>(
    config: &'a Config,
    global: &GlobalArgs,
) -> Result<Vec<(&'a str, &'a DatasourceConfig)>> {
    match &global.datasource {
        Some(name) => {
            config.datasource(name)?;
            Ok(config
                .datasources
                .get_key_value(name.as_str())
                .map(|(key, ds)| (key.as_str(), ds))
                .into_iter()
                .collect())
        }
        None => Ok(config
            .datasources
            .iter()
            .map(|(name, ds)| (name.as_str(), ds))
            .collect()),
    }
}

/// `--silent` wins over the config file's `mode`.
pub(crate) fn effective_mode(config: &Config, global: &GlobalArgs) -> RunMode {
    if global.silent {
        RunMode::Silent
    } else {
        config.mode
    }
}

/// Build the migrator for one datasource.
pub(crate) fn build_migrator(config: &Config, ds: &DatasourceConfig, mode: RunMode) -> Migrator {
    Migrator::new(Registry::new())
        .with_location(ds.folder_absolute(&config.root))
        .with_mode(mode)
        .with_lock_key(ds.lock_key)
}

pub(crate) fn connection_settings(ds: &DatasourceConfig) -> ConnectionSettings {
    ConnectionSettings::new(ds.connection.as_str())
        .with_credentials(ds.user.as_str(), ds.password.as_str())
}

/// Log the per-datasource banner unless silent
pub(crate) fn banner(name: &str, mode: RunMode) {
    if let Some(line) = banner_line(name, mode) {
        log::info!("{line}");
    }
}

pub(crate) fn banner_line(name: &str, mode: RunMode) -> Option<String> {
    (!mode.is_silent()).then(|| format!("#### {name} ####"))
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Maximum width per column across the header and all rows.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Render a left-aligned table with a dashed separator under the header.
pub(crate) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<String>| cells.join("  ").trim_end().to_string();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| format!("{h:<w$}"))
            .collect(),
    ));
    lines.push(line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        lines.push(line(
            row.iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect(),
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
