//! Export command implementation
//!
//! This module implements the `export` command, which writes every series of
//! a dataset to its own CSV file.

use crate::adapters::platform::PlatformClient;
use crate::config::{
    load_config_or_default, MissingDatasetPolicy, MissingKeyPolicy, TsExportConfig, UniqueSuffix,
};
use crate::core::export::{ExportCoordinator, ExportRequest, RunStatistics};
use crate::domain::{DatasetName, PathPattern, TsExportError};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dataset to export
    #[arg(short, long)]
    pub dataset: String,

    /// Path pattern with {key} placeholders, e.g. "{qual_nb_points}/{fid}.csv"
    #[arg(short, long)]
    pub pattern: String,

    /// Absolute destination root (defaults to <temp dir>/<dataset>)
    #[arg(long)]
    pub destination: Option<PathBuf>,

    /// Overwrite files already present in the destination
    #[arg(long)]
    pub overwrite: bool,

    /// Export series one after the other
    #[arg(long)]
    pub sequential: bool,

    /// Worker pool size (0 = one per CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Suffix making the destination root unique
    #[arg(long, value_enum)]
    pub unique_suffix: Option<UniqueSuffix>,

    /// Behaviour when the pattern references a missing metadata key
    #[arg(long, value_enum)]
    pub missing_key: Option<MissingKeyPolicy>,

    /// Behaviour when the dataset is unknown or empty
    #[arg(long, value_enum)]
    pub missing_dataset: Option<MissingDatasetPolicy>,

    /// Remove the destination root on collision, if this run created it
    #[arg(long)]
    pub cleanup_on_collision: bool,

    /// Print the run statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    /// Applies the command line overrides to the export settings
    pub fn apply_overrides(&self, config: &mut TsExportConfig) {
        let export = &mut config.export;
        if self.overwrite {
            export.overwrite = true;
        }
        if self.sequential {
            export.parallel = false;
        }
        if let Some(workers) = self.workers {
            export.max_workers = workers;
        }
        if let Some(suffix) = self.unique_suffix {
            export.unique_suffix = suffix;
        }
        if let Some(policy) = self.missing_key {
            export.missing_key = policy;
        }
        if let Some(policy) = self.missing_dataset {
            export.missing_dataset = policy;
        }
        if self.cleanup_on_collision {
            export.cleanup_on_collision = true;
        }
    }

    /// Builds the export request from the arguments
    pub fn request(&self) -> Result<ExportRequest, TsExportError> {
        let dataset = DatasetName::new(self.dataset.as_str()).map_err(TsExportError::Configuration)?;
        let pattern = PathPattern::parse(self.pattern.as_str())
            .map_err(|e| TsExportError::Configuration(format!("Invalid pattern: {e}")))?;

        if let Some(destination) = &self.destination {
            if !destination.is_absolute() {
                return Err(TsExportError::Configuration(format!(
                    "Destination must be an absolute path, got '{}'",
                    destination.display()
                )));
            }
        }

        Ok(ExportRequest {
            dataset,
            pattern,
            destination: self.destination.clone(),
        })
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(dataset = %self.dataset, pattern = %self.pattern, "Starting export command");

        let mut config = match load_config_or_default(config_path.map(Path::new)) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(e.exit_code());
            }
        };
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let request = match self.request() {
            Ok(request) => request,
            Err(e) => {
                eprintln!("{e}");
                return Ok(e.exit_code());
            }
        };

        let client = match PlatformClient::new(config.platform.clone()) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create platform client");
                eprintln!("Failed to initialize export: {e}");
                return Ok(e.exit_code());
            }
        };

        let coordinator =
            ExportCoordinator::new(client.platform().clone(), config.export, shutdown_signal);

        let stats = match coordinator.execute_export(request).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(e.exit_code());
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_summary(&stats);
        }

        Ok(0)
    }
}

fn print_summary(stats: &RunStatistics) {
    println!();
    println!("Export Summary:");
    println!("  Dataset: {}", stats.dataset);
    println!("  Series: {}", stats.series_count);
    println!("  Files Written: {}", stats.files_written);
    println!("  Empty Series Skipped: {}", stats.empty_series);
    println!("  Fallback Paths: {}", stats.fallback_paths);
    println!("  Total Samples: {}", stats.total_sample_count);
    println!("  Duration: {:.2}s", stats.elapsed_seconds);
    println!("  Output: {}", stats.output_root.display());
    println!();
}
