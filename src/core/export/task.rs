//! Per-series export pipeline
//!
//! One unit of work of a run: resolve metadata, build the path, write the
//! file. Units are independent and only share the path registry.

use crate::core::export::path::PathBuilder;
use crate::core::export::resolver::MetadataResolver;
use crate::core::export::summary::SeriesOutcome;
use crate::core::export::writer::SeriesWriter;
use crate::domain::{PathPattern, Result, SeriesId, TsExportError};
use crate::log_series_exported;

/// Resolve, build and write pipeline shared by all series of a run
pub struct SeriesPipeline {
    resolver: MetadataResolver,
    builder: PathBuilder,
    writer: SeriesWriter,
    pattern: PathPattern,
    /// Pattern used when `pattern` references a missing key; `None` aborts
    fallback: Option<PathPattern>,
}

impl SeriesPipeline {
    pub fn new(
        resolver: MetadataResolver,
        builder: PathBuilder,
        writer: SeriesWriter,
        pattern: PathPattern,
        fallback: Option<PathPattern>,
    ) -> Self {
        Self {
            resolver,
            builder,
            writer,
            pattern,
            fallback,
        }
    }

    /// Exports one series
    pub async fn run(&self, series_id: SeriesId) -> Result<SeriesOutcome> {
        let mut metadata = self.resolver.resolve(&series_id).await?;

        let (path, used_fallback) = match self
            .builder
            .build(&series_id, &self.pattern, &metadata)
            .await
        {
            Ok(path) => (path, false),
            Err(err @ TsExportError::MissingKey { .. }) => {
                let Some(fallback) = &self.fallback else {
                    return Err(err);
                };
                tracing::warn!(
                    series_id = %series_id,
                    error = %err,
                    fallback = %fallback,
                    "Placing series with the fallback pattern"
                );
                self.resolver
                    .ensure_keys(&series_id, &mut metadata, fallback)
                    .await?;
                let path = self.builder.build(&series_id, fallback, &metadata).await?;
                (path, true)
            }
            Err(err) => return Err(err),
        };

        let samples_written = self.writer.write(&path, &series_id).await?;
        if samples_written > 0 {
            log_series_exported!(&series_id, path, samples_written);
        }

        Ok(SeriesOutcome {
            series_id,
            path,
            samples_written,
            used_fallback,
        })
    }
}
