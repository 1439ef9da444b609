//! Record Loader - retrieves one record per (path, regime, run)

use super::{Record, RecordLocation};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only store of per-run records.
///
/// A missing run is a hard failure: implementations never retry and never
/// substitute a default record.
pub trait RecordStore: Send + Sync {
    /// Load the record at `location`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the location does not exist or is unreadable.
    fn load(&self, location: &RecordLocation) -> Result<Record>;
}

/// Filesystem record store reading one JSON document per run.
///
/// # Example
///
/// ```rust,no_run
/// use experiment_results::record::{Artifact, FsRecordStore, RecordLocation, RecordStore, Regime};
///
/// let store = FsRecordStore::with_root("results");
/// let location = RecordLocation::new("dim(3,4)", Regime::ContextAware, 0, Artifact::LossAndMetrics);
/// let record = store.load(&location)?;
/// println!("{} keys", record.len());
/// # Ok::<(), experiment_results::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FsRecordStore {
    root: Option<PathBuf>,
}

impl FsRecordStore {
    /// Store resolving path identifiers as given (relative to the working directory).
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Store resolving path identifiers below `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Get the root directory, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Resolve a location to a concrete file path.
    #[must_use]
    pub fn resolve(&self, location: &RecordLocation) -> PathBuf {
        let relative = location.relative_path();
        match &self.root {
            Some(root) => root.join(relative),
            None => relative,
        }
    }
}

impl RecordStore for FsRecordStore {
    fn load(&self, location: &RecordLocation) -> Result<Record> {
        let file_path = self.resolve(location);

        let bytes = fs::read(&file_path).map_err(|e| Error::StorageError {
            location: file_path.display().to_string(),
            reason: format!("Failed to read record: {e}"),
        })?;

        debug!(path = %file_path.display(), bytes = bytes.len(), "record loaded");

        Record::from_json_slice(location.clone(), &bytes)
    }
}
