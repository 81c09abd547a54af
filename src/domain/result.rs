//! Result type alias for tsexport
//!
//! This module provides a convenient Result type alias that uses TsExportError
//! as the error type.

use super::errors::TsExportError;

/// Result type alias for tsexport operations
///
/// # Examples
///
/// ```
/// use tsexport::domain::result::Result;
/// use tsexport::domain::errors::TsExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TsExportError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TsExportError>;
