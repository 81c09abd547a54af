//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for tsexport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// tsexport - Time series dataset to CSV exporter
#[derive(Parser, Debug)]
#[command(name = "tsexport")]
#[command(version, about, long_about = None)]
#[command(author = "tsexport Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./tsexport.toml when present)
    #[arg(short, long, env = "TSEXPORT_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TSEXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every series of a dataset to CSV files
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
