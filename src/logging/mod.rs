//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted log files with rotation
//! - Configurable log levels (`RUST_LOG` wins when set)
//! - Console output on stderr
//!
//! # Example
//!
//! ```no_run
//! use tsexport::logging::init_logging;
//! use tsexport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(dataset = "TEST_EXPORT_DATA", "Export started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a series written to disk
///
/// # Example
///
/// ```no_run
/// use tsexport::log_series_exported;
/// use tsexport::domain::SeriesId;
/// use std::path::Path;
///
/// let id = SeriesId::new("00001600000300077D0000040003F1").unwrap();
/// log_series_exported!(&id, Path::new("/tmp/out/A.csv"), 14);
/// ```
#[macro_export]
macro_rules! log_series_exported {
    ($series_id:expr, $path:expr, $samples:expr) => {
        tracing::debug!(
            series_id = %$series_id,
            path = %$path.display(),
            samples = $samples,
            "Series exported"
        );
    };
}

/// Log a series that produced no file
///
/// # Example
///
/// ```no_run
/// use tsexport::log_series_skipped;
/// use tsexport::domain::SeriesId;
///
/// let id = SeriesId::new("00001600000300077D0000040003F1").unwrap();
/// log_series_skipped!(&id, "no samples");
/// ```
#[macro_export]
macro_rules! log_series_skipped {
    ($series_id:expr, $reason:expr) => {
        tracing::info!(
            series_id = %$series_id,
            reason = $reason,
            "Series skipped"
        );
    };
}
