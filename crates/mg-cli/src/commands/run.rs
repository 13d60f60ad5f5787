//! Run command implementation

use anyhow::{Context, Result};
use mg_engine::{FailureReason, RunReport, RunStatus};
use serde::Serialize;

use crate::cli::{GlobalArgs, RunArgs, RunOutput};
use crate::commands::common::{
    banner, build_migrator, connection_settings, effective_mode, load_config,
    selected_datasources, ExitCode, EXIT_LOCK_DENIED, EXIT_MIGRATION_FAILED,
};

/// One datasource's entry in `--output json`
#[derive(Debug, Serialize)]
struct DatasourceRun<'a> {
    datasource: &'a str,
    #[serde(flatten)]
    report: RunReport,
}

/// Execute the run command
///
/// Datasources run one after another in name order. The first datasource
/// that does not complete stops the command.
pub(crate) fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let mode = effective_mode(&config, global);
    let datasources = selected_datasources(&config, global)?;

    let mut runs: Vec<DatasourceRun<'_>> = Vec::with_capacity(datasources.len());
    let mut exit = None;

    for (name, ds) in datasources {
        banner(name, mode);
        let migrator = build_migrator(&config, ds, mode);
        let result = migrator
            .run_postgres(&connection_settings(ds))
            .with_context(|| format!("Migration run failed for datasource '{name}'"));

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                if args.output == RunOutput::Json {
                    print_json(&runs)?;
                }
                return Err(e);
            }
        };

        if args.output == RunOutput::Text {
            println!("{}", summarize(name, &report));
        }

        exit = match report.status {
            RunStatus::Completed => None,
            RunStatus::LockDenied => Some(EXIT_LOCK_DENIED),
            RunStatus::Failed(_) => Some(EXIT_MIGRATION_FAILED),
        };
        runs.push(DatasourceRun {
            datasource: name,
            report,
        });
        if exit.is_some() {
            break;
        }
    }

    if args.output == RunOutput::Json {
        print_json(&runs)?;
    }

    match exit {
        Some(code) => Err(ExitCode(code).into()),
        None => Ok(()),
    }
}

fn print_json(runs: &[DatasourceRun<'_>]) -> Result<()> {
    let json = serde_json::to_string_pretty(runs).context("Failed to serialize run report")?;
    println!("{json}");
    Ok(())
}

/// One-paragraph human summary of a run
pub(crate) fn summarize(name: &str, report: &RunReport) -> String {
    let mut out = match &report.status {
        RunStatus::Completed if report.applied.is_empty() => {
            format!("{name}: up to date ({} discovered)", report.discovered)
        }
        RunStatus::Completed => format!(
            "{name}: applied {} migration(s) in {:.2}s",
            report.applied.len(),
            report.elapsed_secs
        ),
        RunStatus::LockDenied => {
            format!("{name}: another process is running migrations; nothing applied")
        }
        RunStatus::Failed(failure) => {
            let detail = match &failure.reason {
                FailureReason::RolledBack(stmt) => match stmt.index {
                    Some(index) => format!(
                        "statement {} rolled back: {}",
                        index + 1,
                        stmt.message
                    ),
                    None => format!("rolled back: {}", stmt.message),
                },
                FailureReason::RecordFailed { message } => {
                    format!("applied but not recorded: {message}")
                }
            };
            format!(
                "{name}: migration #{} {} failed, {detail}",
                failure.id, failure.name
            )
        }
    };

    for applied in &report.applied {
        out.push_str(&format!(
            "\n  #{} {} ({} statement(s), {}ms)",
            applied.id, applied.name, applied.statements, applied.duration_ms
        ));
    }
    if !report.not_attempted.is_empty() {
        let ids: Vec<String> = report.not_attempted.iter().map(|id| id.to_string()).collect();
        out.push_str(&format!("\n  not attempted: {}", ids.join(", ")));
    }
    out
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
