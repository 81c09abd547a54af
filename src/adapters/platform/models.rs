//! Wire models of the temporal data manager REST API
//!
//! These types mirror the JSON payloads returned by the platform and are
//! converted into domain types at the adapter boundary.

use crate::domain::{Metadata, MetadataValue, Sample, SeriesId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET dataset/{name}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetResponse {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub fids: Vec<DatasetMember>,
}

/// One member of a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMember {
    pub tsuid: String,

    #[serde(rename = "funcId", default)]
    pub func_id: Option<String>,
}

impl DatasetResponse {
    /// Member series ids, deduplicated, in first-seen order
    ///
    /// Blank identifiers are dropped.
    pub fn series_ids(&self) -> Vec<SeriesId> {
        let mut seen = std::collections::HashSet::new();
        self.fids
            .iter()
            .filter_map(|member| SeriesId::new(member.tsuid.clone()).ok())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

/// One row of `GET metadata/list/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub tsuid: String,
    pub name: String,
    pub value: String,

    #[serde(default)]
    pub dtype: Option<String>,
}

/// Groups metadata rows by series
///
/// Values keep the platform's text whatever their `dtype`, so a `number`
/// such as `007` renders into paths unchanged. Counts are parsed on read
/// by [`Metadata::point_count`].
pub fn group_metadata(entries: Vec<MetadataEntry>) -> HashMap<SeriesId, Metadata> {
    let mut grouped: HashMap<SeriesId, Metadata> = HashMap::new();
    for entry in entries {
        let Ok(id) = SeriesId::new(entry.tsuid.clone()) else {
            continue;
        };
        grouped
            .entry(id)
            .or_default()
            .insert(entry.name, MetadataValue::Text(entry.value));
    }
    grouped
}

/// `GET metadata/funcId/tsuid/{tsuid}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalIdResponse {
    pub tsuid: String,

    #[serde(rename = "funcId")]
    pub func_id: String,
}

/// `GET timeseries/{tsuid}/points` response row: `[timestamp_ms, value]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointRecord(pub f64, pub f64);

impl From<PointRecord> for Sample {
    fn from(point: PointRecord) -> Self {
        Sample::new(point.0.round() as i64, point.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PathPattern;

    #[test]
    fn test_dataset_response_dedups_members() {
        let json = r#"{
            "name": "TEST_EXPORT_DATA",
            "description": "three series",
            "fids": [
                {"tsuid": "A", "funcId": "FID_A"},
                {"tsuid": "B", "funcId": "FID_B"},
                {"tsuid": "A", "funcId": "FID_A"},
                {"tsuid": " "}
            ]
        }"#;
        let dataset: DatasetResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = dataset
            .series_ids()
            .into_iter()
            .map(SeriesId::into_inner)
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_group_metadata_keeps_raw_values() {
        let json = r#"[
            {"tsuid": "A", "name": "qual_nb_points", "value": "14", "dtype": "number"},
            {"tsuid": "A", "name": "unit", "value": "kW", "dtype": "string"},
            {"tsuid": "B", "name": "qual_ref_period", "value": "1000.5", "dtype": "number"},
            {"tsuid": "B", "name": "label", "value": "42"}
        ]"#;
        let entries: Vec<MetadataEntry> = serde_json::from_str(json).unwrap();
        let grouped = group_metadata(entries);

        let a = &grouped[&SeriesId::new("A").unwrap()];
        assert_eq!(a.get("qual_nb_points"), Some(&MetadataValue::from("14")));
        assert_eq!(a.point_count(), Some(14));
        assert_eq!(a.get("unit"), Some(&MetadataValue::from("kW")));

        let b = &grouped[&SeriesId::new("B").unwrap()];
        assert_eq!(b.get("qual_ref_period"), Some(&MetadataValue::from("1000.5")));
        assert_eq!(b.get("label"), Some(&MetadataValue::from("42")));
        assert_eq!(b.point_count(), None);
    }

    #[test]
    fn test_number_metadata_renders_as_sent() {
        let json = r#"[
            {"tsuid": "A", "name": "period", "value": "1.50", "dtype": "number"},
            {"tsuid": "A", "name": "code", "value": "007", "dtype": "number"},
            {"tsuid": "A", "name": "big", "value": "1e3", "dtype": "number"}
        ]"#;
        let entries: Vec<MetadataEntry> = serde_json::from_str(json).unwrap();
        let grouped = group_metadata(entries);

        let pattern = PathPattern::parse("{period}/{code}/{big}.csv").unwrap();
        let rendered = pattern
            .render(&grouped[&SeriesId::new("A").unwrap()])
            .unwrap();
        assert_eq!(rendered, "1.50/007/1e3.csv");
    }

    #[test]
    fn test_points_to_samples() {
        let points: Vec<PointRecord> =
            serde_json::from_str("[[1000000000000, 5.0], [1000000001000, 6.2]]").unwrap();
        let samples: Vec<Sample> = points.into_iter().map(Sample::from).collect();
        assert_eq!(samples[0], Sample::new(1_000_000_000_000, 5.0));
        assert_eq!(samples[1], Sample::new(1_000_000_001_000, 6.2));
    }
}
