//! Destination root preparation
//!
//! Resolves the root directory of a run, checks that it can be written, and
//! records which files already live there.

use crate::config::UniqueSuffix;
use crate::domain::{CollisionReason, DatasetName, Result, TsExportError};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

const CLEANUP_ATTEMPTS: u32 = 2;
const CLEANUP_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Prepared destination root of a run
#[derive(Debug)]
pub struct Destination {
    root: PathBuf,
    created: bool,
    preexisting: HashSet<PathBuf>,
}

impl Destination {
    /// Resolves, validates and (if needed) creates the destination root
    ///
    /// Without an explicit root, `<temp dir>/<dataset directory name>` is
    /// used. The suffix is applied to the last component of the root.
    ///
    /// # Errors
    ///
    /// - `Configuration` for a relative root or a root that is not a directory
    /// - `Permission` for a root that cannot be written or created
    /// - `Collision` for a non-empty root when `overwrite` is false
    pub async fn prepare(
        explicit: Option<&Path>,
        dataset: &DatasetName,
        suffix: UniqueSuffix,
        overwrite: bool,
    ) -> Result<Self> {
        let base = match explicit {
            Some(path) if !path.is_absolute() => {
                return Err(TsExportError::Configuration(format!(
                    "Destination must be an absolute path, got '{}'",
                    path.display()
                )))
            }
            Some(path) => normalize(path),
            None => std::env::temp_dir().join(dataset.to_directory_name()),
        };
        let root = apply_suffix(&base, suffix);

        match tokio::fs::metadata(&root).await {
            Ok(meta) if !meta.is_dir() => Err(TsExportError::Configuration(format!(
                "Destination {} exists and is not a directory",
                root.display()
            ))),
            Ok(_) => Self::reuse(root, overwrite).await,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&root).await.map_err(|e| {
                    TsExportError::Permission(format!(
                        "Cannot create destination {}: {e}",
                        root.display()
                    ))
                })?;
                tracing::debug!(root = %root.display(), "Created destination root");
                Ok(Self {
                    root,
                    created: true,
                    preexisting: HashSet::new(),
                })
            }
            Err(e) => Err(TsExportError::from_io(e, &root)),
        }
    }

    async fn reuse(root: PathBuf, overwrite: bool) -> Result<Self> {
        probe_writable(&root).await?;

        let existing = scan_files(&root).await?;
        if !overwrite && !is_empty_dir(&root).await? {
            return Err(TsExportError::Collision {
                path: root,
                series_id: None,
                reason: CollisionReason::DestinationNotEmpty,
            });
        }

        tracing::debug!(
            root = %root.display(),
            preexisting = existing.len(),
            "Reusing existing destination root"
        );

        Ok(Self {
            root,
            created: false,
            preexisting: existing,
        })
    }

    /// Root directory of the run
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether this run created the root
    pub fn created_by_run(&self) -> bool {
        self.created
    }

    /// Files present before the run, eligible for overwrite
    pub fn preexisting(&self) -> &HashSet<PathBuf> {
        &self.preexisting
    }

    /// Hands the pre-existing file set over to the path registry
    pub fn take_preexisting(&mut self) -> HashSet<PathBuf> {
        std::mem::take(&mut self.preexisting)
    }

    /// Removes the whole root, only if this run created it
    ///
    /// Returns whether the root was removed. A file operation of a cancelled
    /// series may still be running and recreate entries, so removal is
    /// attempted twice before the cleanup is reported as partial.
    pub async fn remove_if_created(&self) -> Result<bool> {
        if !self.created {
            return Ok(false);
        }
        tracing::warn!(root = %self.root.display(), "Removing destination root");

        let mut last_error = None;
        for attempt in 1..=CLEANUP_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(CLEANUP_RETRY_DELAY).await;
            }
            match tokio::fs::remove_dir_all(&self.root).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(attempt = attempt, error = %e, "Destination removal failed");
                    last_error = Some(TsExportError::from_io(e, &self.root));
                    continue;
                }
            }
            match tokio::fs::try_exists(&self.root).await {
                Ok(false) => return Ok(true),
                Ok(true) => {
                    last_error = Some(TsExportError::Io(format!(
                        "{}: recreated during removal",
                        self.root.display()
                    )))
                }
                Err(e) => last_error = Some(TsExportError::from_io(e, &self.root)),
            }
        }

        tracing::warn!(
            root = %self.root.display(),
            attempts = CLEANUP_ATTEMPTS,
            "Destination cleanup was partial, the root still exists"
        );
        Err(last_error.unwrap_or_else(|| {
            TsExportError::Io(format!("{}: not removed", self.root.display()))
        }))
    }

    /// Removes the root if this run created it and it is still empty
    pub async fn remove_if_created_and_empty(&self) -> Result<bool> {
        if !self.created || !is_empty_dir(&self.root).await? {
            return Ok(false);
        }
        tokio::fs::remove_dir(&self.root)
            .await
            .map_err(|e| TsExportError::from_io(e, &self.root))?;
        tracing::debug!(root = %self.root.display(), "Removed empty destination root");
        Ok(true)
    }
}

/// Appends the unique suffix to the last component of `root`
pub fn apply_suffix(root: &Path, suffix: UniqueSuffix) -> PathBuf {
    let tag = match suffix {
        UniqueSuffix::None => return root.to_path_buf(),
        UniqueSuffix::Timestamp => chrono::Utc::now().format("%Y%m%dT%H%M%S%3f").to_string(),
        UniqueSuffix::Random => uuid::Uuid::new_v4().simple().to_string()[..8].to_string(),
    };
    match root.file_name() {
        Some(name) => root.with_file_name(format!("{}_{tag}", name.to_string_lossy())),
        None => root.join(tag),
    }
}

/// Drops `.` components, repeated separators and trailing separators
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

async fn probe_writable(root: &Path) -> Result<()> {
    let probe = root.join(format!(".tsexport-probe-{}", uuid::Uuid::new_v4().simple()));
    tokio::fs::File::create(&probe).await.map_err(|e| {
        TsExportError::Permission(format!("Destination {} is not writable: {e}", root.display()))
    })?;
    tokio::fs::remove_file(&probe)
        .await
        .map_err(|e| TsExportError::from_io(e, &probe))
}

async fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| TsExportError::from_io(e, dir))?;
    Ok(entries
        .next_entry()
        .await
        .map_err(|e| TsExportError::from_io(e, dir))?
        .is_none())
}

/// Lists every non-directory entry below `root`
async fn scan_files(root: &Path) -> Result<HashSet<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter(|entry| !matches!(entry, Ok(e) if e.file_type().is_dir()))
            .map(|entry| match entry {
                Ok(e) => Ok(e.into_path()),
                Err(e) => {
                    let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                    Err(match e.into_io_error() {
                        Some(io) => TsExportError::from_io(io, &path),
                        None => TsExportError::Io(format!(
                            "Cannot scan destination {}: filesystem loop",
                            path.display()
                        )),
                    })
                }
            })
            .collect::<Result<HashSet<PathBuf>>>()
    })
    .await
    .map_err(|e| TsExportError::Other(format!("Destination scan failed: {e}")))?
}
