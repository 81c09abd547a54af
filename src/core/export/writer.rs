//! CSV series writer
//!
//! Writes one series as a two-column, semicolon-delimited file:
//!
//! ```text
//! Date;Value
//! 2001-09-09T01:46:40.000;5.0
//! ```
//!
//! Values are written as is; a `;` inside a value is not escaped.

use crate::adapters::platform::TimeSeriesPlatform;
use crate::domain::sample::{format_timestamp, format_value};
use crate::domain::{Result, Sample, SeriesId, TsExportError};
use crate::log_series_skipped;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Header line of every exported file
pub const CSV_HEADER: &str = "Date;Value";

const HEADER_FIELDS: [&str; 2] = ["Date", "Value"];

/// Fetches and writes series samples
pub struct SeriesWriter {
    platform: Arc<dyn TimeSeriesPlatform>,
}

impl SeriesWriter {
    pub fn new(platform: Arc<dyn TimeSeriesPlatform>) -> Self {
        Self { platform }
    }

    /// Writes the samples of `series_id` to `path`
    ///
    /// Returns the number of samples written. An empty series produces no
    /// file and returns 0.
    pub async fn write(&self, path: &Path, series_id: &SeriesId) -> Result<usize> {
        let samples = self.platform.read_samples(series_id).await?;
        if samples.is_empty() {
            log_series_skipped!(series_id, "no samples");
            return Ok(0);
        }

        write_csv(path, series_id, &samples).await?;
        Ok(samples.len())
    }
}

/// Creates (or truncates) `path` and writes `samples` to it
pub async fn write_csv(path: &Path, series_id: &SeriesId, samples: &[Sample]) -> Result<()> {
    let content = render_csv(series_id, samples)?;

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| TsExportError::from_io(e, path))?;
    file.write_all(&content)
        .await
        .map_err(|e| TsExportError::from_io(e, path))?;
    file.flush()
        .await
        .map_err(|e| TsExportError::from_io(e, path))
}

/// Renders the header and one `timestamp;value` record per sample
fn render_csv(series_id: &SeriesId, samples: &[Sample]) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::with_capacity(32 * (samples.len() + 1)));

    let csv_error = |e: csv::Error| {
        TsExportError::Serialization(format!("Cannot render series {series_id} as CSV: {e}"))
    };

    wtr.write_record(HEADER_FIELDS).map_err(csv_error)?;
    for sample in samples {
        let timestamp = format_timestamp(sample.timestamp_ms).ok_or_else(|| {
            TsExportError::Serialization(format!(
                "Timestamp {} of series {series_id} is out of range",
                sample.timestamp_ms
            ))
        })?;
        wtr.write_record([timestamp, format_value(sample.value)])
            .map_err(csv_error)?;
    }

    wtr.into_inner().map_err(|e| {
        TsExportError::Serialization(format!("Cannot render series {series_id} as CSV: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::platform::InMemoryPlatform;
    use crate::domain::Metadata;
    use tempfile::TempDir;

    fn id(value: &str) -> SeriesId {
        SeriesId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_write_csv_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("A.csv");
        let samples = vec![
            Sample::new(1_000_000_000_000, 5.0),
            Sample::new(1_000_000_001_000, 6.2),
            Sample::new(1_000_000_002_000, 1e16),
        ];

        write_csv(&path, &id("A"), &samples).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Date;Value\n\
             2001-09-09T01:46:40.000;5.0\n\
             2001-09-09T01:46:41.000;6.2\n\
             2001-09-09T01:46:42.000;1e+16\n"
        );
    }

    #[test]
    fn test_render_csv_never_quotes() {
        let samples = vec![Sample::new(0, -0.25), Sample::new(1, 1e-5)];

        let rendered = String::from_utf8(render_csv(&id("A"), &samples).unwrap()).unwrap();

        assert_eq!(
            rendered,
            "Date;Value\n1970-01-01T00:00:00.000;-0.25\n1970-01-01T00:00:00.001;1e-05\n"
        );
        assert!(!rendered.contains('"'));
        assert!(!rendered.contains('\r'));
    }

    #[tokio::test]
    async fn test_write_truncates_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("A.csv");
        std::fs::write(&path, "stale content that is much longer than the new one\n".repeat(10))
            .unwrap();

        write_csv(&path, &id("A"), &[Sample::new(0, 1.0)]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Date;Value\n1970-01-01T00:00:00.000;1.0\n");
    }

    #[tokio::test]
    async fn test_empty_series_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("E.csv");
        let platform = InMemoryPlatform::new().with_series("E", Metadata::new(), vec![]);
        let writer = SeriesWriter::new(Arc::new(platform));

        let written = writer.write(&path, &id("E")).await.unwrap();

        assert_eq!(written, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_line_count_is_samples_plus_one() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("A.csv");
        let samples: Vec<Sample> = (0..14)
            .map(|i| Sample::new(1_000_000_000_000 + i * 1000, i as f64))
            .collect();
        let platform = InMemoryPlatform::new().with_series("A", Metadata::new(), samples);
        let writer = SeriesWriter::new(Arc::new(platform));

        let written = writer.write(&path, &id("A")).await.unwrap();

        assert_eq!(written, 14);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 15);
        assert_eq!(content.lines().next(), Some(CSV_HEADER));
    }

    #[tokio::test]
    async fn test_vanished_series() {
        let temp = TempDir::new().unwrap();
        let writer = SeriesWriter::new(Arc::new(InMemoryPlatform::new()));
        let err = writer
            .write(&temp.path().join("Z.csv"), &id("Z"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
