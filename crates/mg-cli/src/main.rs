//! Migrator CLI - apply versioned schema migrations to Postgres

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{run, status};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match dispatch(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(*code),
            None => {
                log::error!("{err:#}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
    }
}

/// `info` by default, `debug` with `-v`; `RUST_LOG` overrides both.
fn init_logging(global: &cli::GlobalArgs) {
    let level = if global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .init();
}
