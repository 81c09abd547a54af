//! Path building and collision detection
//!
//! Renders a path pattern against series metadata, joins the result under
//! the destination root, and registers it in the run-scoped set of claimed
//! paths. Registration is atomic: two series can never both claim the same
//! resolved path.

use crate::domain::{
    CollisionReason, Metadata, MissingKey, PathPattern, Result, SeriesId, TsExportError,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Renders `pattern` against `metadata`
///
/// # Errors
///
/// Returns the first placeholder key absent from `metadata`.
pub fn render(pattern: &PathPattern, metadata: &Metadata) -> std::result::Result<String, MissingKey> {
    pattern.render(metadata)
}

/// Collapses every run of path separators into a single `/`
pub fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_was_separator = false;
    for c in path.chars() {
        let is_separator = c == '/' || c == std::path::MAIN_SEPARATOR;
        if is_separator {
            if !previous_was_separator {
                collapsed.push('/');
            }
        } else {
            collapsed.push(c);
        }
        previous_was_separator = is_separator;
    }
    collapsed
}

/// Joins a rendered pattern under `root`
///
/// # Errors
///
/// `Configuration` when the rendered path is empty, ends with a separator
/// (names a directory) or contains a `..` component.
pub fn join_under_root(root: &Path, rendered: &str) -> Result<PathBuf> {
    let collapsed = collapse_separators(rendered);
    let relative = collapsed.trim_start_matches('/');

    if relative.is_empty() {
        return Err(TsExportError::Configuration(format!(
            "Rendered path '{rendered}' is empty"
        )));
    }
    if relative.ends_with('/') {
        return Err(TsExportError::Configuration(format!(
            "Rendered path '{rendered}' names a directory, not a file"
        )));
    }
    if relative.split('/').any(|component| component == "..") {
        return Err(TsExportError::Configuration(format!(
            "Rendered path '{rendered}' escapes the destination root"
        )));
    }

    Ok(root.join(relative))
}

/// Run-scoped registry of claimed paths
#[derive(Debug)]
pub struct PathRegistry {
    claimed: Mutex<HashSet<PathBuf>>,
    preexisting: HashSet<PathBuf>,
    overwrite: bool,
}

impl PathRegistry {
    /// `preexisting` lists the files found in the destination before the run
    pub fn new(preexisting: HashSet<PathBuf>, overwrite: bool) -> Self {
        Self {
            claimed: Mutex::new(HashSet::new()),
            preexisting,
            overwrite,
        }
    }

    /// Registers `path` for `series_id`
    ///
    /// # Errors
    ///
    /// `Collision` when the path was already claimed in this run (even with
    /// overwrite enabled), or when it exists on disk and is not an
    /// overwrite-eligible pre-existing file.
    pub fn claim(&self, path: &Path, series_id: &SeriesId) -> Result<()> {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let reason = if claimed.contains(path) {
            Some(CollisionReason::AlreadyClaimed)
        } else if path.exists() && !(self.overwrite && self.preexisting.contains(path)) {
            Some(CollisionReason::ExistsOnDisk)
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(TsExportError::Collision {
                path: path.to_path_buf(),
                series_id: Some(series_id.to_string()),
                reason,
            });
        }

        claimed.insert(path.to_path_buf());
        Ok(())
    }

    /// Number of paths claimed so far
    pub fn claimed_count(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Builds resolved paths under one destination root
#[derive(Debug, Clone)]
pub struct PathBuilder {
    root: PathBuf,
    registry: Arc<PathRegistry>,
}

impl PathBuilder {
    pub fn new(root: impl Into<PathBuf>, registry: Arc<PathRegistry>) -> Self {
        Self {
            root: root.into(),
            registry,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Renders, joins, claims and prepares the parent directories of the path
    /// of one series
    ///
    /// # Errors
    ///
    /// `MissingKey`, `Configuration` (see [`join_under_root`]), `Collision`,
    /// and `Permission`/`Io` when a directory cannot be created.
    pub async fn build(
        &self,
        series_id: &SeriesId,
        pattern: &PathPattern,
        metadata: &Metadata,
    ) -> Result<PathBuf> {
        let rendered = render(pattern, metadata).map_err(|missing| TsExportError::MissingKey {
            key: missing.key,
            series_id: series_id.to_string(),
            pattern: pattern.to_string(),
        })?;

        let path = join_under_root(&self.root, &rendered)?;
        self.registry.claim(&path, series_id)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TsExportError::from_io(e, parent))?;
        }

        tracing::trace!(
            series_id = %series_id,
            pattern = %pattern,
            path = %path.display(),
            "Resolved series path"
        );

        Ok(path)
    }
}
