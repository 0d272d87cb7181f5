//! TP-7 Utility CLI
//!
//! Command-line interface for converting between multitrack recordings and
//! individual stereo WAV files.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

use tp7::cli::{commands, Cli, Commands};
use tp7::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    debug!("TP-7 Utility v{}", env!("CARGO_PKG_VERSION"));

    match handle_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err.friendly_message());
            for suggestion in err.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            debug!("error code: {} ({:?})", err.error_code(), err);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export { input, output } => {
            commands::export(&input, output.as_deref(), cli.report)
        }
        Commands::Import { inputs, output } => commands::import(&inputs, &output, cli.report),
    }
}
