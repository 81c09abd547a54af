//! Run statistics and reporting
//!
//! This module defines the structures reporting the result of one export run.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::SeriesId;

/// Result of exporting one series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    pub series_id: SeriesId,

    /// Resolved file path; claimed even when no file was written
    pub path: PathBuf,

    /// Samples written (0 for an empty series, which produces no file)
    pub samples_written: usize,

    /// Whether the fallback pattern placed this series
    pub used_fallback: bool,
}

impl SeriesOutcome {
    /// Whether a file was produced
    pub fn wrote_file(&self) -> bool {
        self.samples_written > 0
    }
}

/// Statistics of an export run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Dataset name
    pub dataset: String,

    /// Number of member series
    pub series_count: usize,

    /// Number of files written
    pub files_written: usize,

    /// Number of series skipped because they had no samples
    pub empty_series: usize,

    /// Number of series placed with the fallback pattern
    pub fallback_paths: usize,

    /// Sum of the platform point counts (written counts where missing)
    pub total_sample_count: u64,

    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,

    /// Destination root of the run
    pub output_root: PathBuf,
}

impl RunStatistics {
    /// Create empty statistics for a run
    pub fn new(dataset: impl Into<String>, output_root: impl AsRef<Path>) -> Self {
        Self {
            dataset: dataset.into(),
            series_count: 0,
            files_written: 0,
            empty_series: 0,
            fallback_paths: 0,
            total_sample_count: 0,
            elapsed_seconds: 0.0,
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    /// Accounts for one exported series
    pub fn record(&mut self, outcome: &SeriesOutcome) {
        self.series_count += 1;
        if outcome.wrote_file() {
            self.files_written += 1;
        } else {
            self.empty_series += 1;
        }
        if outcome.used_fallback {
            self.fallback_paths += 1;
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.elapsed_seconds = duration.as_secs_f64();
        self
    }

    /// Log the statistics
    pub fn log_summary(&self) {
        tracing::info!(
            dataset = %self.dataset,
            series_count = self.series_count,
            files_written = self.files_written,
            empty_series = self.empty_series,
            fallback_paths = self.fallback_paths,
            total_sample_count = self.total_sample_count,
            elapsed_seconds = format!("{:.3}", self.elapsed_seconds),
            output_root = %self.output_root.display(),
            "Export completed"
        );

        if self.fallback_paths > 0 {
            tracing::warn!(
                fallback_paths = self.fallback_paths,
                "Some series were placed with the fallback pattern"
            );
        }
    }
}
