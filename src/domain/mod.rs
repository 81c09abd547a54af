//! Domain models and types for tsexport.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`SeriesId`], [`DatasetName`])
//! - **Series data** ([`Metadata`], [`MetadataValue`], [`Sample`])
//! - **Path patterns** ([`PathPattern`]) rendered against metadata
//! - **Error types** ([`TsExportError`], [`PlatformError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TsExportError>`]:
//!
//! ```rust
//! use tsexport::domain::{PathPattern, Result, TsExportError};
//!
//! fn parse(pattern: &str) -> Result<PathPattern> {
//!     PathPattern::parse(pattern).map_err(TsExportError::Configuration)
//! }
//! # assert!(parse("{fid}.csv").is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod metadata;
pub mod pattern;
pub mod result;
pub mod sample;

// Re-export commonly used types for convenience
pub use errors::{CollisionReason, PlatformError, TsExportError};
pub use ids::{DatasetName, SeriesId};
pub use metadata::{Metadata, MetadataValue, DATASET_KEY, FID_KEY, NB_POINTS_KEY};
pub use pattern::{MissingKey, PathPattern};
pub use result::Result;
pub use sample::Sample;
