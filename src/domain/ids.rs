//! Domain identifier types with validation
//!
//! Newtype wrappers for platform identifiers. Each type ensures type safety
//! and rejects blank values at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Series identifier newtype wrapper
///
/// Opaque handle naming one time series on the platform (the TSUID).
/// No internal structure is assumed.
///
/// # Examples
///
/// ```
/// use tsexport::domain::ids::SeriesId;
/// use std::str::FromStr;
///
/// let id = SeriesId::from_str("00001600000300077D0000040003F1").unwrap();
/// assert_eq!(id.as_str(), "00001600000300077D0000040003F1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(String);

impl SeriesId {
    /// Creates a new SeriesId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(SeriesId)` if the ID is not blank, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Series ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the series ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeriesId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SeriesId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Dataset name newtype wrapper
///
/// Names an external collection of series on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetName(String);

impl DatasetName {
    /// Creates a new DatasetName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Dataset name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the dataset name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generates a directory name for the default destination root
    ///
    /// Lowercases the name and replaces anything that is not alphanumeric,
    /// `-`, `_` or `.` with a single underscore, so the result is always one
    /// path component.
    pub fn to_directory_name(&self) -> String {
        let sanitized = self.0.to_lowercase().replace(
            |c: char| !c.is_alphanumeric() && c != '_' && c != '-' && c != '.',
            "_",
        );

        // Remove consecutive underscores
        let mut result = String::new();
        let mut last_was_underscore = false;
        for c in sanitized.chars() {
            if c == '_' {
                if !last_was_underscore {
                    result.push(c);
                    last_was_underscore = true;
                }
            } else {
                result.push(c);
                last_was_underscore = false;
            }
        }

        let result = result.trim_matches('_').to_string();
        if result.is_empty() || result.chars().all(|c| c == '.') {
            "dataset".to_string()
        } else {
            result
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DatasetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_id_creation() {
        let id = SeriesId::new("ts-0001").unwrap();
        assert_eq!(id.as_str(), "ts-0001");
        assert_eq!(format!("{id}"), "ts-0001");
    }

    #[test]
    fn test_series_id_empty_fails() {
        assert!(SeriesId::new("").is_err());
        assert!(SeriesId::new("   ").is_err());
    }

    #[test]
    fn test_series_id_from_str() {
        let id: SeriesId = "ABC123".parse().unwrap();
        assert_eq!(id.into_inner(), "ABC123");
    }

    #[test]
    fn test_dataset_name_empty_fails() {
        assert!(DatasetName::new("").is_err());
    }

    #[test]
    fn test_dataset_name_to_directory_name() {
        let name = DatasetName::new("TEST_EXPORT_DATA").unwrap();
        assert_eq!(name.to_directory_name(), "test_export_data");

        let name = DatasetName::new("Portfolio / 2018 Q1").unwrap();
        assert_eq!(name.to_directory_name(), "portfolio_2018_q1");

        let name = DatasetName::new("..").unwrap();
        assert_eq!(name.to_directory_name(), "dataset");
    }

    #[test]
    fn test_dataset_name_serialization() {
        let name = DatasetName::new("Portfolio").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Portfolio\"");
        let back: DatasetName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
