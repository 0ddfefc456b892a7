//! CLI module for gumbel-nas
//!
//! This module contains the command handlers and output utilities.

mod commands;
mod logging;

pub use commands::run_command;
pub use logging::{init_logger, LogLevel};

// Re-export Cli from config for convenience
pub use crate::config::Cli;
