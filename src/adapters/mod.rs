//! External system integrations for tsexport.
//!
//! - [`platform`] - Time-series platform integration (IKATS REST API,
//!   in-memory implementation)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind the
//! [`platform::TimeSeriesPlatform`] trait so the export core can run against
//! the REST binding or an in-memory implementation.
//!
//! ```rust,no_run
//! use tsexport::adapters::platform::PlatformClient;
//! use tsexport::config::PlatformConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PlatformConfig {
//!     base_url: "https://ikats.example.com/TemporalDataManagerWebApp/webapi".to_string(),
//!     ..Default::default()
//! };
//!
//! let client = PlatformClient::new(config)?;
//! # Ok(())
//! # }
//! ```

pub mod platform;
