//! Time-series platform adapter
//!
//! This module provides the integration with the time-series platform:
//! the platform trait, the IKATS REST binding, an in-memory implementation,
//! the client factory, and the API wire models.

pub mod client;
pub mod memory;
pub mod models;
pub mod vendor;

pub use client::PlatformClient;
pub use memory::InMemoryPlatform;
pub use vendor::{IkatsPlatform, TimeSeriesPlatform};
