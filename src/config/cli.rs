//! CLI argument types

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Differentiable architecture search with Gumbel-softmax mixtures
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "gumbel-nas")]
#[command(version)]
#[command(about = "Differentiable architecture search with Gumbel-softmax mixture layers")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run an architecture search from YAML configuration
    Search(SearchArgs),

    /// Validate a configuration file without searching
    Validate(ValidateArgs),
}

/// Arguments for the search command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SearchArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the search result as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show detailed validation report
    #[arg(short, long)]
    pub detailed: bool,
}
