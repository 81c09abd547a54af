//! Platform client factory
//!
//! Selects the platform implementation named by `platform.vendor`.

use crate::config::PlatformConfig;
use crate::domain::{DatasetName, Result, TsExportError};
use std::sync::Arc;

use super::vendor::{IkatsPlatform, TimeSeriesPlatform};

/// Platform client that wraps a vendor implementation
pub struct PlatformClient {
    platform: Arc<dyn TimeSeriesPlatform>,
}

impl PlatformClient {
    /// Create a new platform client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor is not supported or if the vendor
    /// cannot be initialized.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tsexport::adapters::platform::PlatformClient;
    /// use tsexport::config::PlatformConfig;
    ///
    /// # fn example() -> tsexport::domain::Result<()> {
    /// let client = PlatformClient::new(PlatformConfig::default())?;
    /// println!("Platform at {}", client.base_url());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let vendor = config.vendor.to_lowercase();

        let platform: Arc<dyn TimeSeriesPlatform> = match vendor.as_str() {
            "ikats" => Arc::new(IkatsPlatform::new(config)?),
            _ => {
                return Err(TsExportError::Configuration(format!(
                    "Unsupported platform vendor: {vendor}. Supported vendors: ikats"
                )))
            }
        };

        Ok(Self { platform })
    }

    /// Wraps an existing platform implementation
    pub fn from_platform(platform: Arc<dyn TimeSeriesPlatform>) -> Self {
        Self { platform }
    }

    /// Get a reference to the underlying platform implementation
    pub fn platform(&self) -> &Arc<dyn TimeSeriesPlatform> {
        &self.platform
    }

    /// Checks that the platform answers by reading a dataset
    ///
    /// An unknown dataset still proves the platform is reachable.
    pub async fn health_check(&self, dataset: &DatasetName) -> Result<()> {
        match self.platform.dataset_members(dataset).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                tracing::error!(
                    base_url = self.platform.base_url(),
                    error = %e,
                    "Platform health check failed"
                );
                return Err(e);
            }
        }
        tracing::info!(
            base_url = self.platform.base_url(),
            "Platform health check passed"
        );
        Ok(())
    }

    /// Get the base URL of the platform
    pub fn base_url(&self) -> &str {
        self.platform.base_url()
    }
}
