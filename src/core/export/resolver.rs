//! Metadata resolution
//!
//! Fetches the metadata record of a series and completes it with the keys
//! the exporter provides itself: the dataset name under `ds`, and the
//! functional identifier under `fid` when a pattern needs it.

use crate::adapters::platform::TimeSeriesPlatform;
use crate::domain::{
    DatasetName, Metadata, PathPattern, Result, SeriesId, DATASET_KEY, FID_KEY,
};
use std::sync::Arc;

/// Resolves series metadata for one dataset and one pattern
pub struct MetadataResolver {
    platform: Arc<dyn TimeSeriesPlatform>,
    dataset: DatasetName,
    pattern: PathPattern,
}

impl MetadataResolver {
    pub fn new(
        platform: Arc<dyn TimeSeriesPlatform>,
        dataset: DatasetName,
        pattern: PathPattern,
    ) -> Self {
        Self {
            platform,
            dataset,
            pattern,
        }
    }

    /// Metadata of `series_id`, ready to render the run pattern
    ///
    /// The dataset name overrides any platform attribute named `ds`.
    pub async fn resolve(&self, series_id: &SeriesId) -> Result<Metadata> {
        let mut metadata = self.platform.read_metadata(series_id).await?;
        metadata.insert(DATASET_KEY, self.dataset.as_str());
        self.ensure_keys(series_id, &mut metadata, &self.pattern)
            .await?;
        Ok(metadata)
    }

    /// Adds the lazily fetched keys `pattern` references and `metadata` lacks
    pub async fn ensure_keys(
        &self,
        series_id: &SeriesId,
        metadata: &mut Metadata,
        pattern: &PathPattern,
    ) -> Result<()> {
        if pattern.references(FID_KEY) && !metadata.contains_key(FID_KEY) {
            let functional_id = self.platform.functional_id(series_id).await?;
            metadata.insert(FID_KEY, functional_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::platform::InMemoryPlatform;

    fn platform() -> InMemoryPlatform {
        InMemoryPlatform::new()
            .with_series(
                "A",
                Metadata::new()
                    .with("qual_nb_points", 14i64)
                    .with(DATASET_KEY, "platform value"),
                vec![],
            )
            .with_functional_id("A", "FID_A")
    }

    fn resolver(platform: &InMemoryPlatform, pattern: &str) -> MetadataResolver {
        MetadataResolver::new(
            Arc::new(platform.clone()),
            DatasetName::new("TEST_EXPORT_DATA").unwrap(),
            PathPattern::parse(pattern).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_resolve_injects_dataset_and_fid() {
        let platform = platform();
        let metadata = resolver(&platform, "{ds}/{fid}.csv")
            .resolve(&SeriesId::new("A").unwrap())
            .await
            .unwrap();

        assert_eq!(metadata.get(DATASET_KEY).unwrap().to_string(), "TEST_EXPORT_DATA");
        assert_eq!(metadata.get(FID_KEY).unwrap().to_string(), "FID_A");
        assert_eq!(platform.functional_id_calls(), 1);
    }

    #[tokio::test]
    async fn test_fid_not_fetched_when_unreferenced() {
        let platform = platform();
        let metadata = resolver(&platform, "{qual_nb_points}.csv")
            .resolve(&SeriesId::new("A").unwrap())
            .await
            .unwrap();

        assert!(!metadata.contains_key(FID_KEY));
        assert_eq!(platform.functional_id_calls(), 0);
    }

    #[tokio::test]
    async fn test_ensure_keys_for_other_pattern() {
        let platform = platform();
        let resolver = resolver(&platform, "{unit}.csv");
        let id = SeriesId::new("A").unwrap();

        let mut metadata = resolver.resolve(&id).await.unwrap();
        assert!(!metadata.contains_key(FID_KEY));

        resolver
            .ensure_keys(&id, &mut metadata, &PathPattern::parse("{fid}.csv").unwrap())
            .await
            .unwrap();
        assert_eq!(metadata.get(FID_KEY).unwrap().to_string(), "FID_A");
    }

    #[tokio::test]
    async fn test_unknown_series() {
        let platform = platform();
        let err = resolver(&platform, "{fid}.csv")
            .resolve(&SeriesId::new("Z").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
