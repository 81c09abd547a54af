//! Domain error types
//!
//! This module defines the error hierarchy for tsexport.
//! All errors are domain-specific and don't expose third-party types.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main tsexport error type
///
/// This is the primary error type used throughout the application.
/// Every variant produced while exporting a series carries enough context
/// (series id, attempted path, pattern) to diagnose the failure without
/// re-running the export.
#[derive(Debug, Error)]
pub enum TsExportError {
    /// Configuration-related errors (malformed destination, pattern or file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Destination not writable or directory creation denied
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Time-series platform errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// The pattern references a metadata key the series does not carry
    #[error("Metadata key '{key}' referenced by pattern '{pattern}' is missing for series {series_id}")]
    MissingKey {
        key: String,
        series_id: String,
        pattern: String,
    },

    /// Two resolved paths coincide without permission to overwrite
    #[error(
        "Collision on {} ({reason}){}",
        .path.display(),
        .series_id.as_deref().map(|id| format!(" for series {id}")).unwrap_or_default()
    )]
    Collision {
        path: PathBuf,
        /// Series whose path was rejected; `None` for destination-level checks
        series_id: Option<String>,
        reason: CollisionReason,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The run was interrupted by a shutdown signal
    #[error("Export cancelled: {0}")]
    Cancelled(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl TsExportError {
    /// Returns true for the "not found" family (unknown dataset or series)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TsExportError::Platform(PlatformError::DatasetNotFound(_))
                | TsExportError::Platform(PlatformError::SeriesNotFound(_))
        )
    }

    /// Returns true for path collisions of any kind
    pub fn is_collision(&self) -> bool {
        matches!(self, TsExportError::Collision { .. })
    }

    /// Process exit code used by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TsExportError::Configuration(_) => 2,
            TsExportError::Permission(_) => 3,
            TsExportError::Platform(_) => 4,
            TsExportError::Cancelled(_) => 130,
            _ => 5,
        }
    }

    /// Builds an error from an I/O failure on `path`, keeping permission
    /// failures distinguishable from other I/O errors.
    pub fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                TsExportError::Permission(format!("{}: {err}", path.display()))
            }
            _ => TsExportError::Io(format!("{}: {err}", path.display())),
        }
    }
}

/// Why a resolved path was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionReason {
    /// Another series already claimed the path in this run
    AlreadyClaimed,
    /// The file exists and is not an overwrite-eligible pre-existing file
    ExistsOnDisk,
    /// The destination holds files and overwriting is disabled
    DestinationNotEmpty,
}

impl fmt::Display for CollisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CollisionReason::AlreadyClaimed => "path already produced by another series in this run",
            CollisionReason::ExistsOnDisk => "file already exists and may not be overwritten",
            CollisionReason::DestinationNotEmpty => {
                "destination is not empty and overwrite is disabled"
            }
        };
        f.write_str(text)
    }
}

/// Time-series platform errors
///
/// Errors that occur when talking to the platform.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Failed to connect to the platform
    #[error("Failed to connect to platform: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Dataset not found
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// Series not found
    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl PlatformError {
    /// Whether retrying the request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlatformError::ConnectionFailed(_)
                | PlatformError::Timeout(_)
                | PlatformError::ServerError { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TsExportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => TsExportError::Permission(err.to_string()),
            _ => TsExportError::Io(err.to_string()),
        }
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TsExportError {
    fn from(err: serde_json::Error) -> Self {
        TsExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TsExportError {
    fn from(err: toml::de::Error) -> Self {
        TsExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
