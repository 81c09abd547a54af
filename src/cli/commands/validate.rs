//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the tsexport configuration file.

use crate::config::{load_config_or_default, TsExportConfig};
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let shown = config_path.unwrap_or(crate::config::DEFAULT_CONFIG_FILE);
        tracing::info!(config_path = %shown, "Validating configuration");

        println!("🔍 Validating configuration file: {shown}");
        println!();

        // Loading already validates; a failure here covers both cases
        let config = match load_config_or_default(config_path.map(Path::new)) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);
        Ok(0)
    }
}

fn print_summary(config: &TsExportConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Platform Vendor: {}", config.platform.vendor);
    println!("  Platform URL: {}", config.platform.base_url);
    println!(
        "  Authentication: {}",
        config
            .platform
            .username
            .as_deref()
            .map(|user| format!("basic ({user})"))
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "  Destination: {}",
        config
            .export
            .destination
            .as_deref()
            .unwrap_or("<temp dir>/<dataset>")
    );
    println!("  Parallel: {}", config.export.parallel);
    println!("  Max Workers: {}", config.export.max_workers);
    println!("  Overwrite: {}", config.export.overwrite);
    println!("  Missing Key Policy: {:?}", config.export.missing_key);
    println!("  Fallback Pattern: {}", config.export.fallback_pattern);
    println!("  Missing Dataset Policy: {:?}", config.export.missing_dataset);
    println!();
}
