//! Status command implementation

use anyhow::{Context, Result};
use mg_db::PostgresBackend;
use mg_engine::StatusReport;
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{
    build_migrator, connection_settings, effective_mode, format_table, load_config,
    selected_datasources,
};

#[derive(Debug, Serialize)]
struct DatasourceStatus<'a> {
    datasource: &'a str,
    #[serde(flatten)]
    status: StatusReport,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let mode = effective_mode(&config, global);

    let mut statuses = Vec::new();
    for (name, ds) in selected_datasources(&config, global)? {
        let migrator = build_migrator(&config, ds, mode);
        // discover before connecting so a bad folder fails without a round trip
        migrator
            .discover()
            .with_context(|| format!("Failed to discover migrations for '{name}'"))?;
        let settings = connection_settings(ds);
        if !mode.is_silent() {
            log::info!("Connecting to {}", settings.display_target());
        }
        let db = PostgresBackend::connect(&settings)
            .with_context(|| format!("Failed to connect to datasource '{name}'"))?;
        let status = migrator
            .status(db)
            .with_context(|| format!("Failed to read status for '{name}'"))?;
        statuses.push(DatasourceStatus {
            datasource: name,
            status,
        });
    }

    match args.output {
        StatusOutput::Json => {
            let json =
                serde_json::to_string_pretty(&statuses).context("Failed to serialize status")?;
            println!("{json}");
        }
        StatusOutput::Table => {
            let rows: Vec<Vec<String>> = statuses
                .iter()
                .flat_map(|s| status_rows(s.datasource, &s.status))
                .collect();
            println!(
                "{}",
                format_table(&["DATASOURCE", "ID", "NAME", "STATUS"], &rows)
            );
            let pending: usize = statuses.iter().map(|s| s.status.pending_count()).sum();
            println!("\n{} pending migration(s)", pending);
        }
    }
    Ok(())
}

/// Table rows for one datasource: discovered units, then orphaned ledger rows
pub(crate) fn status_rows(datasource: &str, status: &StatusReport) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = status
        .entries
        .iter()
        .map(|entry| {
            vec![
                datasource.to_string(),
                entry.id.to_string(),
                entry.name.clone(),
                if entry.applied { "applied" } else { "pending" }.to_string(),
            ]
        })
        .collect();
    rows.extend(status.orphaned.iter().map(|id| {
        vec![
            datasource.to_string(),
            id.to_string(),
            "-".to_string(),
            "orphaned".to_string(),
        ]
    }));
    rows
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
