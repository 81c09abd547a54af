//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub output: String,

    /// Include every setting with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing tsexport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your platform URL", self.output);
                println!("  2. Set TSEXPORT_PLATFORM_USERNAME and TSEXPORT_PLATFORM_PASSWORD");
                println!("     if the platform requires authentication");
                println!("  3. Validate configuration: tsexport validate-config");
                println!("  4. Run export: tsexport export --dataset <name> --pattern \"{{fid}}.csv\"");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# tsexport Configuration File

[application]
log_level = "info"

[platform]
vendor = "ikats"
base_url = "http://localhost:8180/TemporalDataManagerWebApp/webapi"

[export]
parallel = true
overwrite = false
missing_key = "fallback"
fallback_pattern = "{fid}.csv"
missing_dataset = "empty"

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with every setting documented
    fn generate_config_with_examples() -> String {
        r#"# tsexport Configuration File
# Exports the time series of a dataset to one CSV file per series.
#
# Any value may reference an environment variable with ${VAR_NAME}.
# Every setting can also be overridden with TSEXPORT_<SECTION>_<KEY>,
# for example TSEXPORT_EXPORT_MAX_WORKERS=4.

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

[platform]
# Platform vendor (only "ikats" is supported)
vendor = "ikats"

# Base URL of the platform REST API
base_url = "http://localhost:8180/TemporalDataManagerWebApp/webapi"

# Basic authentication, both or neither
# username = "${TSEXPORT_PLATFORM_USERNAME}"
# password = "${TSEXPORT_PLATFORM_PASSWORD}"

# Request timeout in seconds
timeout_seconds = 60

# Verify TLS certificates
tls_verify = true

# Number of series per bulk metadata request
metadata_batch_size = 100

[platform.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

[export]
# Absolute destination root; defaults to <temp dir>/<dataset name>
# destination = "/data/exports"

# Export series concurrently
parallel = true

# Worker pool size; 0 uses one worker per CPU
max_workers = 0

# Overwrite files that existed before the run
overwrite = false

# Make the destination root unique: none, timestamp or random
unique_suffix = "none"

# Missing pattern key: fallback (use fallback_pattern) or abort
missing_key = "fallback"
fallback_pattern = "{fid}.csv"

# Unknown or empty dataset: empty (succeed with no file) or fail
missing_dataset = "empty"

# Remove the destination root on collision if this run created it
cleanup_on_collision = false

# Seconds to wait for in-flight series after a failure or a signal
shutdown_timeout_secs = 30

[logging]
# JSON log file next to the console output
local_enabled = false
local_path = "/var/log/tsexport"
# Rotation: daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}
