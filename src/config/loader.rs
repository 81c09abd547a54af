//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{MissingDatasetPolicy, MissingKeyPolicy, TsExportConfig, UniqueSuffix};
use super::secret_string;
use crate::domain::errors::TsExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tsexport.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TsExportConfig
/// 4. Applies environment variable overrides (TSEXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use tsexport::config::loader::load_config;
///
/// let config = load_config("tsexport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TsExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TsExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TsExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: TsExportConfig = toml::from_str(&contents)
        .map_err(|e| TsExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads configuration, tolerating a missing default file
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is read
/// when present; otherwise the built-in defaults are used. Environment
/// overrides and validation apply in every case.
pub fn load_config_or_default(path: Option<&Path>) -> Result<TsExportConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config(default_path)
            } else {
                tracing::debug!(
                    file = DEFAULT_CONFIG_FILE,
                    "No configuration file found, using defaults"
                );
                finish(TsExportConfig::default())
            }
        }
    }
}

fn finish(mut config: TsExportConfig) -> Result<TsExportConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TsExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TsExportError::Other(format!("Invalid substitution regex: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TsExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        TsExportError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

fn parse_enum_override<T: clap::ValueEnum>(name: &str, value: &str) -> Result<T> {
    T::from_str(value.trim(), true).map_err(|_| {
        TsExportError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using TSEXPORT_* prefix
///
/// Environment variables follow the pattern: TSEXPORT_<SECTION>_<KEY>
/// For example: TSEXPORT_PLATFORM_BASE_URL, TSEXPORT_EXPORT_OVERWRITE
fn apply_env_overrides(config: &mut TsExportConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("TSEXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Platform overrides
    if let Some(val) = var("TSEXPORT_PLATFORM_VENDOR") {
        config.platform.vendor = val;
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_BASE_URL") {
        config.platform.base_url = val;
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_USERNAME") {
        config.platform.username = Some(val);
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_PASSWORD") {
        config.platform.password = Some(secret_string(val));
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_TIMEOUT_SECONDS") {
        config.platform.timeout_seconds = parse_override("TSEXPORT_PLATFORM_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_TLS_VERIFY") {
        config.platform.tls_verify = parse_override("TSEXPORT_PLATFORM_TLS_VERIFY", &val)?;
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_METADATA_BATCH_SIZE") {
        config.platform.metadata_batch_size =
            parse_override("TSEXPORT_PLATFORM_METADATA_BATCH_SIZE", &val)?;
    }
    if let Some(val) = var("TSEXPORT_PLATFORM_RETRY_MAX_RETRIES") {
        config.platform.retry.max_retries =
            parse_override("TSEXPORT_PLATFORM_RETRY_MAX_RETRIES", &val)?;
    }

    // Export overrides
    if let Some(val) = var("TSEXPORT_EXPORT_DESTINATION") {
        config.export.destination = Some(val);
    }
    if let Some(val) = var("TSEXPORT_EXPORT_PARALLEL") {
        config.export.parallel = parse_override("TSEXPORT_EXPORT_PARALLEL", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_MAX_WORKERS") {
        config.export.max_workers = parse_override("TSEXPORT_EXPORT_MAX_WORKERS", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_OVERWRITE") {
        config.export.overwrite = parse_override("TSEXPORT_EXPORT_OVERWRITE", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_UNIQUE_SUFFIX") {
        config.export.unique_suffix =
            parse_enum_override::<UniqueSuffix>("TSEXPORT_EXPORT_UNIQUE_SUFFIX", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_MISSING_KEY") {
        config.export.missing_key =
            parse_enum_override::<MissingKeyPolicy>("TSEXPORT_EXPORT_MISSING_KEY", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_FALLBACK_PATTERN") {
        config.export.fallback_pattern = val;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_MISSING_DATASET") {
        config.export.missing_dataset =
            parse_enum_override::<MissingDatasetPolicy>("TSEXPORT_EXPORT_MISSING_DATASET", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_CLEANUP_ON_COLLISION") {
        config.export.cleanup_on_collision =
            parse_override("TSEXPORT_EXPORT_CLEANUP_ON_COLLISION", &val)?;
    }
    if let Some(val) = var("TSEXPORT_EXPORT_SHUTDOWN_TIMEOUT_SECS") {
        config.export.shutdown_timeout_secs =
            parse_override("TSEXPORT_EXPORT_SHUTDOWN_TIMEOUT_SECS", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("TSEXPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("TSEXPORT_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("TSEXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("TSEXPORT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TSEXPORT_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${TSEXPORT_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("TSEXPORT_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("TSEXPORT_LOADER_MISSING_VAR");
        let input = "password = \"${TSEXPORT_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("TSEXPORT_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("TSEXPORT_LOADER_COMMENTED_VAR");
        let input = "# password = \"${TSEXPORT_LOADER_COMMENTED_VAR}\"\nlog_level = \"info\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${TSEXPORT_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(TsExportError::Configuration(_))));
    }

    #[test]
    fn test_load_config_or_default_missing_explicit_file() {
        let result = load_config_or_default(Some(Path::new("/nonexistent/tsexport.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[platform]
base_url = "https://ikats.example.com/TemporalDataManagerWebApp/webapi"
username = "user"
password = "pass"

[platform.retry]
max_retries = 2

[export]
destination = "/data/exports"
parallel = false
missing_key = "abort"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(
            config.platform.base_url,
            "https://ikats.example.com/TemporalDataManagerWebApp/webapi"
        );
        assert_eq!(config.platform.retry.max_retries, 2);
        assert_eq!(config.export.destination.as_deref(), Some("/data/exports"));
        assert!(!config.export.parallel);
        assert_eq!(config.export.missing_key, MissingKeyPolicy::Abort);
        assert_eq!(config.export.fallback_pattern, "{fid}.csv");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[export]\ndestination = \"relative/dir\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_parse_overrides() {
        assert_eq!(parse_override::<usize>("X", " 8 ").unwrap(), 8);
        assert!(parse_override::<bool>("X", "maybe").is_err());
        assert_eq!(
            parse_enum_override::<UniqueSuffix>("X", "Random").unwrap(),
            UniqueSuffix::Random
        );
        assert!(parse_enum_override::<MissingKeyPolicy>("X", "skip").is_err());
    }
}
