//! Series metadata
//!
//! A metadata record is a string-keyed mapping of scalar values attached to
//! one series. Path patterns are rendered against it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Functional identifier key, fetched lazily when a pattern references it
pub const FID_KEY: &str = "fid";

/// Dataset name key, injected by the exporter
pub const DATASET_KEY: &str = "ds";

/// Platform-computed number of points in a series
pub const NB_POINTS_KEY: &str = "qual_nb_points";

/// A scalar metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl MetadataValue {
    /// Interprets the value as a non-negative count
    ///
    /// Text is parsed, so the platform's `"14"` and `"14.0"` both count 14.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            MetadataValue::Integer(i) => u64::try_from(*i).ok(),
            MetadataValue::Float(f) => float_count(*f),
            MetadataValue::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_count))
            }
            MetadataValue::Boolean(_) => None,
        }
    }
}

fn float_count(f: f64) -> Option<u64> {
    (f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64).then_some(f as u64)
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => f.write_str(&super::sample::format_value(*v)),
            MetadataValue::Boolean(b) => write!(f, "{b}"),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

/// Metadata record of one series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Iterates over attribute names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sample count declared by the platform, if any
    pub fn point_count(&self) -> Option<u64> {
        self.get(NB_POINTS_KEY).and_then(MetadataValue::as_count)
    }
}

impl FromIterator<(String, MetadataValue)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, MetadataValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
