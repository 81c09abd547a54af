//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tsexport::config::{
    load_config, load_config_or_default, MissingDatasetPolicy, MissingKeyPolicy, UniqueSuffix,
};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for name in [
        "TSEXPORT_APPLICATION_LOG_LEVEL",
        "TSEXPORT_PLATFORM_BASE_URL",
        "TSEXPORT_PLATFORM_USERNAME",
        "TSEXPORT_PLATFORM_PASSWORD",
        "TSEXPORT_EXPORT_MAX_WORKERS",
        "TSEXPORT_EXPORT_PARALLEL",
        "TSEXPORT_EXPORT_UNIQUE_SUFFIX",
        "TSEXPORT_EXPORT_MISSING_DATASET",
        "TEST_PLATFORM_PASSWORD",
    ] {
        std::env::remove_var(name);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[platform]
vendor = "ikats"
base_url = "https://ikats.example.com/TemporalDataManagerWebApp/webapi"
username = "analyst"
password = "secret"
timeout_seconds = 30
tls_verify = false
metadata_batch_size = 50

[platform.retry]
max_retries = 5
initial_delay_ms = 100
max_delay_ms = 2000
backoff_multiplier = 1.5

[export]
destination = "/data/exports"
parallel = true
max_workers = 8
overwrite = true
unique_suffix = "timestamp"
missing_key = "abort"
fallback_pattern = "misc/{fid}.csv"
missing_dataset = "fail"
cleanup_on_collision = true
shutdown_timeout_secs = 10

[logging]
local_enabled = true
local_path = "/tmp/tsexport-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.platform.username.as_deref(), Some("analyst"));
    assert_eq!(
        config.platform.password.as_ref().unwrap().expose_secret(),
        "secret"
    );
    assert_eq!(config.platform.timeout_seconds, 30);
    assert!(!config.platform.tls_verify);
    assert_eq!(config.platform.metadata_batch_size, 50);
    assert_eq!(config.platform.retry.max_retries, 5);
    assert_eq!(config.export.max_workers, 8);
    assert!(config.export.overwrite);
    assert_eq!(config.export.unique_suffix, UniqueSuffix::Timestamp);
    assert_eq!(config.export.missing_key, MissingKeyPolicy::Abort);
    assert_eq!(config.export.fallback_pattern, "misc/{fid}.csv");
    assert_eq!(config.export.missing_dataset, MissingDatasetPolicy::Fail);
    assert!(config.export.cleanup_on_collision);
    assert_eq!(config.export.shutdown_timeout_secs, 10);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.platform.vendor, "ikats");
    assert!(config.export.parallel);
    assert_eq!(config.export.max_workers, 0);
    assert!(!config.export.overwrite);
    assert_eq!(config.export.missing_key, MissingKeyPolicy::Fallback);
    assert_eq!(config.export.missing_dataset, MissingDatasetPolicy::Empty);
    assert_eq!(config.export.fallback_pattern, "{fid}.csv");
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_PLATFORM_PASSWORD", "from-env");

    let file = write_config(
        r#"
[platform]
username = "analyst"
password = "${TEST_PLATFORM_PASSWORD}"
"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(
        config.platform.password.as_ref().unwrap().expose_secret(),
        "from-env"
    );
    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[platform]
username = "analyst"
password = "${TEST_PLATFORM_PASSWORD}"
"#,
    );
    let err = load_config(file.path()).unwrap_err();

    assert!(err.to_string().contains("TEST_PLATFORM_PASSWORD"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TSEXPORT_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("TSEXPORT_EXPORT_MAX_WORKERS", "3");
    std::env::set_var("TSEXPORT_EXPORT_PARALLEL", "false");
    std::env::set_var("TSEXPORT_EXPORT_UNIQUE_SUFFIX", "random");
    std::env::set_var("TSEXPORT_EXPORT_MISSING_DATASET", "fail");

    let file = write_config("[export]\nmax_workers = 16\n");
    let config = load_config(file.path()).unwrap();
    cleanup_env_vars();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.export.max_workers, 3);
    assert!(!config.export.parallel);
    assert_eq!(config.export.unique_suffix, UniqueSuffix::Random);
    assert_eq!(config.export.missing_dataset, MissingDatasetPolicy::Fail);
}

#[test]
fn test_invalid_env_override_fails() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TSEXPORT_EXPORT_MAX_WORKERS", "many");

    let result = load_config(write_config("").path());
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("TSEXPORT_EXPORT_MAX_WORKERS"));
}

#[test]
fn test_credentials_override_from_env() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TSEXPORT_PLATFORM_USERNAME", "env-user");
    std::env::set_var("TSEXPORT_PLATFORM_PASSWORD", "env-pass");

    let result = load_config(write_config("").path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.platform.username.as_deref(), Some("env-user"));
    assert_eq!(
        config.platform.password.as_ref().unwrap().expose_secret(),
        "env-pass"
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for content in [
        "[application]\nlog_level = \"loud\"\n",
        "[platform]\nvendor = \"influx\"\n",
        "[platform]\nbase_url = \"ftp://ikats.local\"\n",
        "[platform]\nusername = \"only-user\"\n",
        "[export]\ndestination = \"relative\"\n",
        "[export]\nmissing_key = \"skip\"\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ] {
        let result = load_config(write_config(content).path());
        assert!(result.is_err(), "expected rejection of {content:?}");
    }
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let result = load_config_or_default(Some(std::path::Path::new(
        "/nonexistent/dir/tsexport.toml",
    )));
    assert!(result.is_err());
}
