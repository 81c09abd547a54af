//! Core business logic for tsexport.
//!
//! # Modules
//!
//! - [`export`] - Export orchestration, path building and CSV writing
//!
//! # Export Workflow
//!
//! 1. **Validate**: Check the destination root and record pre-existing files
//! 2. **Resolve Members**: Read the dataset's series from the platform
//! 3. **Dispatch**: Per series, resolve metadata, build the path, write the CSV
//! 4. **Aggregate**: Sum point counts and report run statistics
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tsexport::adapters::platform::PlatformClient;
//! use tsexport::config::load_config;
//! use tsexport::core::export::{ExportCoordinator, ExportRequest};
//! use tsexport::domain::{DatasetName, PathPattern};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tsexport.toml")?;
//! let client = PlatformClient::new(config.platform.clone())?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(client.platform().clone(), config.export, shutdown_rx);
//!
//! let stats = coordinator
//!     .execute_export(ExportRequest {
//!         dataset: DatasetName::new("TEST_EXPORT_DATA")?,
//!         pattern: PathPattern::parse("{qual_nb_points}/{fid}.csv")?,
//!         destination: None,
//!     })
//!     .await?;
//!
//! println!("Files written: {}", stats.files_written);
//! # Ok(())
//! # }
//! ```

pub mod export;
