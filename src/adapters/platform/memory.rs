//! In-memory platform
//!
//! A [`TimeSeriesPlatform`] backed by plain maps, used to run the exporter
//! without a platform server (tests, dry runs against fixtures).

use super::TimeSeriesPlatform;
use crate::domain::{DatasetName, Metadata, PlatformError, Result, Sample, SeriesId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct SeriesRecord {
    metadata: Metadata,
    functional_id: Option<String>,
    samples: Vec<Sample>,
    failing: bool,
}

/// Map-backed platform
///
/// Blank series ids passed to the builder methods are ignored.
///
/// ```
/// use tsexport::adapters::platform::InMemoryPlatform;
/// use tsexport::domain::{Metadata, Sample};
///
/// let platform = InMemoryPlatform::new()
///     .with_series("A", Metadata::new(), vec![Sample::new(0, 1.0)])
///     .with_functional_id("A", "FID_A")
///     .with_dataset("D", &["A"]);
/// # let _ = platform;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlatform {
    datasets: HashMap<String, Vec<SeriesId>>,
    series: HashMap<SeriesId, SeriesRecord>,
    latency: Option<Duration>,
    functional_id_calls: Arc<AtomicUsize>,
    sample_reads: Arc<AtomicUsize>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, id: &str) -> Option<&mut SeriesRecord> {
        let id = SeriesId::new(id).ok()?;
        Some(self.series.entry(id).or_default())
    }

    /// Registers a series with its metadata and samples
    pub fn with_series(mut self, id: &str, metadata: Metadata, samples: Vec<Sample>) -> Self {
        if let Some(record) = self.record(id) {
            record.metadata = metadata;
            record.samples = samples;
        }
        self
    }

    /// Sets the functional identifier of a series
    pub fn with_functional_id(mut self, id: &str, functional_id: &str) -> Self {
        if let Some(record) = self.record(id) {
            record.functional_id = Some(functional_id.to_string());
        }
        self
    }

    /// Makes sample reads of a series fail with a server error
    pub fn with_failing_series(mut self, id: &str) -> Self {
        if let Some(record) = self.record(id) {
            record.failing = true;
        }
        self
    }

    /// Declares a dataset; members need not be registered series
    pub fn with_dataset(mut self, name: &str, members: &[&str]) -> Self {
        let ids = members
            .iter()
            .filter_map(|m| SeriesId::new(*m).ok())
            .collect();
        self.datasets.insert(name.to_string(), ids);
        self
    }

    /// Delays every sample read
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of functional id lookups served so far
    pub fn functional_id_calls(&self) -> usize {
        self.functional_id_calls.load(Ordering::SeqCst)
    }

    /// Number of sample reads served so far
    pub fn sample_reads(&self) -> usize {
        self.sample_reads.load(Ordering::SeqCst)
    }

    fn lookup(&self, series_id: &SeriesId) -> Result<&SeriesRecord> {
        self.series
            .get(series_id)
            .ok_or_else(|| PlatformError::SeriesNotFound(series_id.to_string()).into())
    }
}

#[async_trait]
impl TimeSeriesPlatform for InMemoryPlatform {
    async fn dataset_members(&self, dataset: &DatasetName) -> Result<Vec<SeriesId>> {
        let members = self
            .datasets
            .get(dataset.as_str())
            .ok_or_else(|| PlatformError::DatasetNotFound(dataset.to_string()))?;

        let mut seen = HashSet::new();
        Ok(members
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect())
    }

    async fn read_metadata(&self, series_id: &SeriesId) -> Result<Metadata> {
        Ok(self.lookup(series_id)?.metadata.clone())
    }

    async fn read_metadata_bulk(
        &self,
        series_ids: &[SeriesId],
    ) -> Result<HashMap<SeriesId, Metadata>> {
        Ok(series_ids
            .iter()
            .filter_map(|id| {
                self.series
                    .get(id)
                    .map(|record| (id.clone(), record.metadata.clone()))
            })
            .collect())
    }

    async fn functional_id(&self, series_id: &SeriesId) -> Result<String> {
        self.functional_id_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(series_id)?
            .functional_id
            .clone()
            .ok_or_else(|| PlatformError::SeriesNotFound(series_id.to_string()).into())
    }

    async fn read_samples(&self, series_id: &SeriesId) -> Result<Vec<Sample>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.sample_reads.fetch_add(1, Ordering::SeqCst);

        let record = self.lookup(series_id)?;
        if record.failing {
            return Err(PlatformError::ServerError {
                status: 500,
                message: format!("points of {series_id} unavailable"),
            }
            .into());
        }
        Ok(record.samples.clone())
    }

    fn base_url(&self) -> &str {
        "memory://"
    }
}
