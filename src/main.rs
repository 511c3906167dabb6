//! td: record, list, and check off short text tasks.

use clap::Parser;
use clap::error::ErrorKind;
use std::process::ExitCode;
use td::cli::{AVAILABLE_COMMANDS, Cli};
use td::config::Config;
use td::dispatch::{ListOptions, execute};
use td::error::TdResult;
use td::logging::{self, LogTarget};
use td::store::open_store;
use tracing::{debug, warn};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version output also arrive here.
            print!("{}", err.render());
            if !err.use_stderr() {
                return ExitCode::SUCCESS;
            }
            if err.kind() == ErrorKind::InvalidSubcommand {
                println!("Available commands: {}", AVAILABLE_COMMANDS);
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init(&LogTarget::parse(&cli.log), cli.verbose) {
        println!("Error: {:#}", err);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            if err.is_usage() {
                debug!(error_code = ?err.code(), error = %err, "Rejected arguments");
            } else {
                warn!(error_code = ?err.code(), error = %err, "Command failed");
            }
            println!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> TdResult<ExitCode> {
    let Some(command) = cli.command.clone() else {
        println!("Error: no command provided");
        println!("Available commands: {}", AVAILABLE_COMMANDS);
        return Ok(ExitCode::FAILURE);
    };

    // Reject bad arguments before any storage is created.
    let operation = command.into_operation()?;

    let mut config = Config::discover(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    debug!(backend = ?config.storage.backend, ?operation, "Running command");

    let store = open_store(&config.storage)?;
    let list = ListOptions::new(config.display.timestamps);
    let outcome =
        execute(store.as_ref(), operation, &list)?.into_strict(config.strict_not_found)?;

    println!("{}", outcome);
    Ok(ExitCode::SUCCESS)
}
