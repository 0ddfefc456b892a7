//! gumbel-nas CLI
//!
//! # Usage
//!
//! ```bash
//! # Run a search
//! gumbel-nas search configs/search.yaml
//!
//! # Run with overrides and save the result
//! gumbel-nas search configs/search.yaml --epochs 10 --seed 3 --output result.json
//!
//! # Validate config
//! gumbel-nas validate configs/search.yaml --detailed
//! ```

use clap::Parser;
use gumbel_nas::cli::{init_logger, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
