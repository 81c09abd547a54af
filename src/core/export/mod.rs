//! Export orchestration
//!
//! This module provides the core export logic for tsexport:
//! - Destination preparation ([`destination`])
//! - Pattern-driven, collision-safe path building ([`path`])
//! - Metadata resolution ([`resolver`]) and CSV writing ([`writer`])
//! - The per-series pipeline ([`task`]) and its coordination ([`coordinator`])
//! - Run statistics ([`summary`])

pub mod coordinator;
pub mod destination;
pub mod path;
pub mod resolver;
pub mod summary;
pub mod task;
pub mod writer;

pub use coordinator::{ExportCoordinator, ExportRequest};
pub use destination::Destination;
pub use path::{PathBuilder, PathRegistry};
pub use resolver::MetadataResolver;
pub use summary::{RunStatistics, SeriesOutcome};
pub use task::SeriesPipeline;
pub use writer::SeriesWriter;
