// tsexport - Time series dataset to CSV exporter
// Copyright (c) 2025 tsexport Contributors
// Licensed under the MIT License

//! # tsexport - Time series dataset to CSV exporter
//!
//! tsexport writes every time series of a platform dataset to its own
//! semicolon-delimited CSV file. File locations come from a path pattern
//! whose `{key}` placeholders are filled from each series' metadata.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** dataset members, metadata and samples from a time series
//!   platform over REST
//! - **Placing** each series under a destination root with a path pattern
//! - **Writing** one `Date;Value` CSV file per non-empty series
//! - **Reporting** run statistics
//!
//! ## Architecture
//!
//! tsexport follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (destination, paths, export coordination)
//! - [`adapters`] - External integrations (time series platform)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tsexport::adapters::platform::PlatformClient;
//! use tsexport::config::load_config;
//! use tsexport::core::export::{ExportCoordinator, ExportRequest};
//! use tsexport::domain::{DatasetName, PathPattern};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("tsexport.toml")?;
//!     let client = PlatformClient::new(config.platform)?;
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let coordinator =
//!         ExportCoordinator::new(client.platform().clone(), config.export, shutdown_rx);
//!
//!     let stats = coordinator
//!         .execute_export(ExportRequest {
//!             dataset: DatasetName::new("TEST_EXPORT_DATA")?,
//!             pattern: PathPattern::parse("{qual_nb_points}/{fid}.csv")?,
//!             destination: None,
//!         })
//!         .await?;
//!
//!     println!("Wrote {} files to {}", stats.files_written, stats.output_root.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! tsexport uses the [`domain::TsExportError`] type for all errors. Each
//! variant maps to a process exit code through
//! [`domain::TsExportError::exit_code`].
//!
//! ## Logging
//!
//! tsexport uses structured logging with the `tracing` crate. Console output
//! goes to stderr so that `--json` statistics on stdout stay parseable.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
