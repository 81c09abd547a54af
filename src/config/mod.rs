//! Configuration management for tsexport.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! tsexport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TSEXPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tsexport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tsexport.toml")?;
//!
//! println!("Platform URL: {}", config.platform.base_url);
//! println!("Parallel export: {}", config.export.parallel);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`PlatformConfig`] - Time-series platform connection and retries
//! - [`ExportConfig`] - Destination, parallelism and collision policies
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [platform]
//! base_url = "https://ikats.example.com/TemporalDataManagerWebApp/webapi"
//! username = "tsexport"
//! password = "${TSEXPORT_PLATFORM_PASSWORD}"
//!
//! [export]
//! destination = "/data/exports/sensors"
//! overwrite = false
//! missing_key = "fallback"
//! fallback_pattern = "{fid}.csv"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{
    ApplicationConfig, ExportConfig, LoggingConfig, MissingDatasetPolicy, MissingKeyPolicy,
    PlatformConfig, RetryConfig, TsExportConfig, UniqueSuffix,
};
pub use secrecy::SecretString;

/// Wraps a plain string into a [`SecretString`]
///
/// The value is zeroed on drop and redacted in `Debug` output.
///
/// ```rust
/// use secrecy::ExposeSecret;
/// use tsexport::config::secret_string;
///
/// let password = secret_string("s3cret".to_string());
/// assert_eq!(password.expose_secret(), "s3cret");
/// assert!(!format!("{password:?}").contains("s3cret"));
/// ```
pub fn secret_string(value: String) -> SecretString {
    SecretString::new(value)
}
