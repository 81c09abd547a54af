//! Configuration schema types
//!
//! This module defines the configuration structure for tsexport. Every
//! section has defaults, so an empty file (or no file at all) is a valid
//! configuration pointing at a local platform.

use crate::config::SecretString;
use crate::domain::PathPattern;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when the dataset is unknown or has no member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingDatasetPolicy {
    /// Log and return an empty result
    #[default]
    Empty,
    /// Fail the run with a not-found error
    Fail,
}

/// What to do when a pattern references a key a series does not carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Log and place that series with `export.fallback_pattern`
    #[default]
    Fallback,
    /// Fail the whole run
    Abort,
}

/// Suffix appended to the destination root to make it unique per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UniqueSuffix {
    /// Use the destination as is
    #[default]
    None,
    /// `_<UTC timestamp>` with millisecond precision
    Timestamp,
    /// `_<8 random hex chars>`
    Random,
}

/// Main tsexport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TsExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Time-series platform connection
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TsExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.platform.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for platform requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!(
                "platform.retry.max_retries must be <= 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "platform.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "platform.retry.initial_delay_ms ({}) cannot exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Time-series platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform implementation (only "ikats" is supported)
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// Base URL of the temporal data manager REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Username for basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Series per bulk metadata request
    #[serde(default = "default_metadata_batch_size")]
    pub metadata_batch_size: usize,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl PlatformConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let valid_vendors = ["ikats"];
        if !valid_vendors.contains(&self.vendor.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid platform.vendor '{}'. Must be one of: {}",
                self.vendor,
                valid_vendors.join(", ")
            ));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("platform.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("platform.base_url must start with http:// or https://".to_string());
        }

        match (&self.username, &self.password) {
            (Some(user), _) if user.is_empty() => {
                return Err("platform.username cannot be empty when set".to_string())
            }
            (Some(_), None) => {
                return Err("platform.password is required when platform.username is set".to_string())
            }
            (None, Some(_)) => {
                return Err("platform.username is required when platform.password is set".to_string())
            }
            (Some(_), Some(password)) if password.expose_secret().is_empty() => {
                return Err("platform.password cannot be empty".to_string())
            }
            _ => {}
        }

        if self.timeout_seconds == 0 {
            return Err("platform.timeout_seconds must be > 0".to_string());
        }

        if self.metadata_batch_size == 0 || self.metadata_batch_size > 1000 {
            return Err(format!(
                "platform.metadata_batch_size must be between 1 and 1000, got {}",
                self.metadata_batch_size
            ));
        }

        self.retry.validate()
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            metadata_batch_size: default_metadata_batch_size(),
            retry: RetryConfig::default(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination root (absolute). Defaults to `<temp dir>/<dataset name>`.
    #[serde(default)]
    pub destination: Option<String>,

    /// Export series in parallel (true) or one after the other (false)
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Worker pool size; 0 means the host's available parallelism
    #[serde(default)]
    pub max_workers: usize,

    /// Allow overwriting files already present in the destination
    #[serde(default)]
    pub overwrite: bool,

    /// Suffix making the destination root unique per run
    #[serde(default)]
    pub unique_suffix: UniqueSuffix,

    /// Behaviour when the pattern references a missing metadata key
    #[serde(default)]
    pub missing_key: MissingKeyPolicy,

    /// Pattern used for series hit by a missing key under the fallback policy
    #[serde(default = "default_fallback_pattern")]
    pub fallback_pattern: String,

    /// Behaviour when the dataset is unknown or empty
    #[serde(default)]
    pub missing_dataset: MissingDatasetPolicy,

    /// Remove the destination root on collision, if this run created it
    #[serde(default)]
    pub cleanup_on_collision: bool,

    /// Maximum time to wait for in-flight series after a fatal error or a
    /// shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(destination) = &self.destination {
            if !Path::new(destination).is_absolute() {
                return Err(format!(
                    "export.destination must be an absolute path, got '{destination}'"
                ));
            }
        }

        if self.max_workers > 256 {
            return Err(format!(
                "export.max_workers must be between 0 and 256, got {}",
                self.max_workers
            ));
        }

        PathPattern::parse(self.fallback_pattern.as_str())
            .map_err(|e| format!("Invalid export.fallback_pattern: {e}"))?;

        if self.shutdown_timeout_secs == 0 {
            return Err("export.shutdown_timeout_secs must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            destination: None,
            parallel: true,
            max_workers: 0,
            overwrite: false,
            unique_suffix: UniqueSuffix::default(),
            missing_key: MissingKeyPolicy::default(),
            fallback_pattern: default_fallback_pattern(),
            missing_dataset: MissingDatasetPolicy::default(),
            cleanup_on_collision: false,
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory holding log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_vendor() -> String {
    "ikats".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8180/TemporalDataManagerWebApp/webapi".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_metadata_batch_size() -> usize {
    100
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_fallback_pattern() -> String {
    "{fid}.csv".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_local_path() -> String {
    "/var/log/tsexport".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_default_config_is_valid() {
        let config = TsExportConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.export.parallel);
        assert!(!config.export.overwrite);
        assert_eq!(config.export.missing_key, MissingKeyPolicy::Fallback);
        assert_eq!(config.export.missing_dataset, MissingDatasetPolicy::Empty);
        assert_eq!(config.export.unique_suffix, UniqueSuffix::None);
        assert_eq!(config.export.fallback_pattern, "{fid}.csv");
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_platform_config_validation() {
        let mut config = PlatformConfig::default();
        assert!(config.validate().is_ok());

        config.base_url = "ftp://ikats.example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config = PlatformConfig {
            vendor: "influx".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = PlatformConfig {
            metadata_batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_platform_credentials_must_pair() {
        let config = PlatformConfig {
            username: Some("user".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlatformConfig {
            password: Some(secret_string("pass".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlatformConfig {
            username: Some("user".to_string()),
            password: Some(secret_string("pass".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_validation() {
        let mut config = RetryConfig::default();
        assert!(config.validate().is_ok());

        config.max_retries = 11;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        config.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.backoff_multiplier = 2.0;
        config.initial_delay_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = ExportConfig::default();
        assert!(config.validate().is_ok());

        config.destination = Some("relative/out".to_string());
        assert!(config.validate().is_err());

        config.destination = Some("/data/exports".to_string());
        assert!(config.validate().is_ok());

        config.fallback_pattern = "{fid.csv".to_string();
        assert!(config.validate().is_err());

        config.fallback_pattern = "{fid}.csv".to_string();
        config.max_workers = 1000;
        assert!(config.validate().is_err());

        config.max_workers = 4;
        config.shutdown_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_enums_from_toml() {
        let config: ExportConfig = toml::from_str(
            r#"
missing_key = "abort"
missing_dataset = "fail"
unique_suffix = "timestamp"
"#,
        )
        .unwrap();
        assert_eq!(config.missing_key, MissingKeyPolicy::Abort);
        assert_eq!(config.missing_dataset, MissingDatasetPolicy::Fail);
        assert_eq!(config.unique_suffix, UniqueSuffix::Timestamp);

        let bad: Result<ExportConfig, _> = toml::from_str("missing_key = \"ignore\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = " ".to_string();
        assert!(config.validate().is_err());
    }
}
