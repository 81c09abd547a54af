//! Export coordinator - main orchestrator for the export process
//!
//! Resolves the dataset into its member series, prepares the destination,
//! fans out one [`SeriesPipeline`] run per series on a bounded pool of tokio
//! tasks (or one after the other), and aggregates the run statistics.
//!
//! A run walks through these states, each transition logged at `debug`:
//!
//! ```text
//! VALIDATING -> RESOLVING_MEMBERS -> DISPATCHING -> AWAITING_COMPLETION -> AGGREGATING -> DONE
//!      \_________________________________________________________________________________> FAILED
//! ```

use crate::adapters::platform::TimeSeriesPlatform;
use crate::config::{ExportConfig, MissingDatasetPolicy, MissingKeyPolicy};
use crate::core::export::destination::Destination;
use crate::core::export::path::{PathBuilder, PathRegistry};
use crate::core::export::resolver::MetadataResolver;
use crate::core::export::summary::{RunStatistics, SeriesOutcome};
use crate::core::export::task::SeriesPipeline;
use crate::core::export::writer::SeriesWriter;
use crate::domain::{
    DatasetName, Metadata, PathPattern, PlatformError, Result, SeriesId, TsExportError,
};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// What to export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub dataset: DatasetName,
    pub pattern: PathPattern,
    /// Absolute destination root; overrides `export.destination`
    pub destination: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportState {
    Validating,
    ResolvingMembers,
    Dispatching,
    AwaitingCompletion,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Validating => "VALIDATING",
            ExportState::ResolvingMembers => "RESOLVING_MEMBERS",
            ExportState::Dispatching => "DISPATCHING",
            ExportState::AwaitingCompletion => "AWAITING_COMPLETION",
            ExportState::Aggregating => "AGGREGATING",
            ExportState::Done => "DONE",
            ExportState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

fn enter(dataset: &DatasetName, state: ExportState) {
    tracing::debug!(dataset = %dataset, state = %state, "Export state");
}

/// Export coordinator
pub struct ExportCoordinator {
    platform: Arc<dyn TimeSeriesPlatform>,
    settings: ExportConfig,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    ///
    /// A `true` value on `shutdown_signal` cancels a running export.
    pub fn new(
        platform: Arc<dyn TimeSeriesPlatform>,
        settings: ExportConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            platform,
            settings,
            shutdown_signal,
        }
    }

    /// Execute the export
    ///
    /// # Errors
    ///
    /// The first fatal error of any series aborts the run: dispatch stops,
    /// in-flight series are cancelled, and the error is returned. Files
    /// already written stay in place unless a collision triggers the
    /// cleanup of a root created by this run.
    pub async fn execute_export(&self, request: ExportRequest) -> Result<RunStatistics> {
        let start_time = Instant::now();
        let dataset = request.dataset.clone();

        tracing::info!(
            dataset = %dataset,
            pattern = %request.pattern,
            parallel = self.settings.parallel,
            overwrite = self.settings.overwrite,
            "Starting export"
        );

        enter(&dataset, ExportState::Validating);
        let (mut destination, fallback) = match self.validate(&request).await {
            Ok(prepared) => prepared,
            Err(e) => {
                enter(&dataset, ExportState::Failed);
                return Err(e);
            }
        };

        enter(&dataset, ExportState::ResolvingMembers);
        let members = match self.resolve_members(&dataset).await {
            Ok(members) => members,
            Err(e) => {
                enter(&dataset, ExportState::Failed);
                destination.remove_if_created_and_empty().await?;
                return Err(e);
            }
        };

        if members.is_empty() {
            tracing::warn!(dataset = %dataset, "Dataset has no member series, nothing to export");
            destination.remove_if_created_and_empty().await?;
            enter(&dataset, ExportState::Done);
            return Ok(RunStatistics::new(dataset.as_str(), destination.root())
                .with_duration(start_time.elapsed()));
        }

        enter(&dataset, ExportState::Dispatching);
        let registry = Arc::new(PathRegistry::new(
            destination.take_preexisting(),
            self.settings.overwrite,
        ));
        let pipeline = Arc::new(SeriesPipeline::new(
            MetadataResolver::new(self.platform.clone(), dataset.clone(), request.pattern.clone()),
            PathBuilder::new(destination.root(), registry),
            SeriesWriter::new(self.platform.clone()),
            request.pattern.clone(),
            fallback,
        ));

        let dispatched = if self.settings.parallel {
            self.dispatch_parallel(&dataset, pipeline, &members).await
        } else {
            self.dispatch_sequential(&dataset, &pipeline, &members).await
        };

        let outcomes = match dispatched {
            Ok(outcomes) => outcomes,
            Err(e) => {
                enter(&dataset, ExportState::Failed);
                tracing::error!(dataset = %dataset, error = %e, "Export failed");
                if e.is_collision() && self.settings.cleanup_on_collision {
                    if let Err(cleanup) = destination.remove_if_created().await {
                        tracing::error!(error = %cleanup, "Failed to remove destination root");
                    }
                }
                return Err(e);
            }
        };

        enter(&dataset, ExportState::Aggregating);
        let mut stats = RunStatistics::new(dataset.as_str(), destination.root());
        for outcome in &outcomes {
            stats.record(outcome);
        }
        stats.total_sample_count = self.total_sample_count(&members, &outcomes).await;
        let stats = stats.with_duration(start_time.elapsed());

        enter(&dataset, ExportState::Done);
        stats.log_summary();

        Ok(stats)
    }

    async fn validate(
        &self,
        request: &ExportRequest,
    ) -> Result<(Destination, Option<PathPattern>)> {
        let fallback = match self.settings.missing_key {
            MissingKeyPolicy::Abort => None,
            MissingKeyPolicy::Fallback => Some(
                PathPattern::parse(self.settings.fallback_pattern.as_str()).map_err(|e| {
                    TsExportError::Configuration(format!("Invalid fallback pattern: {e}"))
                })?,
            ),
        };

        let explicit = request
            .destination
            .clone()
            .or_else(|| self.settings.destination.as_ref().map(PathBuf::from));

        let destination = Destination::prepare(
            explicit.as_deref(),
            &request.dataset,
            self.settings.unique_suffix,
            self.settings.overwrite,
        )
        .await?;

        Ok((destination, fallback))
    }

    async fn resolve_members(&self, dataset: &DatasetName) -> Result<Vec<SeriesId>> {
        let policy = self.settings.missing_dataset;
        let members = match self.platform.dataset_members(dataset).await {
            Ok(members) => members,
            Err(e) if e.is_not_found() && policy == MissingDatasetPolicy::Empty => {
                tracing::warn!(dataset = %dataset, error = %e, "Dataset not found");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if members.is_empty() && policy == MissingDatasetPolicy::Fail {
            return Err(PlatformError::DatasetNotFound(format!("{dataset} (no member series)")).into());
        }

        tracing::info!(dataset = %dataset, series_count = members.len(), "Resolved dataset members");
        Ok(members)
    }

    async fn dispatch_sequential(
        &self,
        dataset: &DatasetName,
        pipeline: &SeriesPipeline,
        members: &[SeriesId],
    ) -> Result<Vec<SeriesOutcome>> {
        enter(dataset, ExportState::AwaitingCompletion);
        let mut shutdown = self.shutdown_signal.clone();
        let mut outcomes = Vec::with_capacity(members.len());

        for series_id in members {
            tokio::select! {
                outcome = pipeline.run(series_id.clone()) => outcomes.push(outcome?),
                _ = wait_for_shutdown(&mut shutdown) => return Err(cancelled()),
            }
        }

        Ok(outcomes)
    }

    async fn dispatch_parallel(
        &self,
        dataset: &DatasetName,
        pipeline: Arc<SeriesPipeline>,
        members: &[SeriesId],
    ) -> Result<Vec<SeriesOutcome>> {
        let workers = worker_count(members.len(), self.settings.max_workers);
        tracing::debug!(workers = workers, series_count = members.len(), "Starting worker pool");

        let mut pending = members.iter().cloned();
        let mut join_set = JoinSet::new();
        let mut outcomes = Vec::with_capacity(members.len());
        let mut shutdown = self.shutdown_signal.clone();

        let spawn = |join_set: &mut JoinSet<Result<SeriesOutcome>>, series_id: SeriesId| {
            let pipeline = pipeline.clone();
            join_set.spawn(async move { pipeline.run(series_id).await });
        };

        for series_id in pending.by_ref().take(workers) {
            spawn(&mut join_set, series_id);
        }
        if members.len() <= workers {
            enter(dataset, ExportState::AwaitingCompletion);
        }

        let failure = loop {
            tokio::select! {
                joined = join_set.join_next() => match joined {
                    None => break None,
                    Some(Ok(Ok(outcome))) => {
                        outcomes.push(outcome);
                        if let Some(series_id) = pending.next() {
                            spawn(&mut join_set, series_id);
                            if pending.len() == 0 {
                                enter(dataset, ExportState::AwaitingCompletion);
                            }
                        }
                    }
                    Some(Ok(Err(e))) => break Some(e),
                    Some(Err(join_error)) => {
                        break Some(TsExportError::Other(format!("Series task failed: {join_error}")))
                    }
                },
                _ = wait_for_shutdown(&mut shutdown) => break Some(cancelled()),
            }
        };

        match failure {
            None => Ok(outcomes),
            Some(e) => {
                self.drain(join_set).await;
                Err(e)
            }
        }
    }

    /// Cancels in-flight series and waits a bounded time for them to stop
    async fn drain(&self, mut join_set: JoinSet<Result<SeriesOutcome>>) {
        let in_flight = join_set.len();
        join_set.abort_all();

        let timeout = Duration::from_secs(self.settings.shutdown_timeout_secs);
        let drained = tokio::time::timeout(timeout, async {
            while join_set.join_next().await.is_some() {}
        })
        .await;

        match drained {
            Ok(()) => tracing::debug!(in_flight = in_flight, "Cancelled in-flight series"),
            Err(_) => tracing::warn!(
                in_flight = in_flight,
                timeout_secs = self.settings.shutdown_timeout_secs,
                "In-flight series did not stop within the shutdown timeout"
            ),
        }
    }

    /// Sums the platform point counts, using written counts where missing
    async fn total_sample_count(&self, members: &[SeriesId], outcomes: &[SeriesOutcome]) -> u64 {
        let metadata = match self.platform.read_metadata_bulk(members).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(error = %e, "Bulk metadata read failed, counting written samples");
                Default::default()
            }
        };

        outcomes
            .iter()
            .map(|outcome| {
                metadata
                    .get(&outcome.series_id)
                    .and_then(Metadata::point_count)
                    .unwrap_or(outcome.samples_written as u64)
            })
            .sum()
    }
}

/// Pool size: `min(series, workers)` where 0 workers means one per CPU
pub fn worker_count(series_count: usize, max_workers: usize) -> usize {
    let workers = if max_workers == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        max_workers
    };
    series_count.min(workers).max(1)
}

/// Resolves once the shutdown flag is set; never resolves if the sender is gone
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn cancelled() -> TsExportError {
    tracing::warn!("Shutdown signal received, cancelling export");
    TsExportError::Cancelled("shutdown signal received".to_string())
}
