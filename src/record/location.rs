//! Record locations - where a run's artifact lives in the record store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File extension of persisted records.
pub const RECORD_EXTENSION: &str = "json";

/// Training regime of a run.
///
/// Regimes are mutually exclusive per aggregation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Standard training where the sender sees the context.
    #[default]
    ContextAware,
    /// Training without context information.
    ContextUnaware,
}

impl Regime {
    /// Map the boolean regime selector to a regime.
    #[must_use]
    pub const fn from_context_unaware(context_unaware: bool) -> Self {
        if context_unaware {
            Self::ContextUnaware
        } else {
            Self::ContextAware
        }
    }

    /// Directory name of this regime below a path.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::ContextAware => "context_aware",
            Self::ContextUnaware => "context_unaware",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Kind of per-run artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// Accuracy and message length curves plus final test accuracy.
    LossAndMetrics,
    /// Entropy-based scores (NMI, effectiveness, consistency).
    EntropyScores,
}

impl Artifact {
    /// File stem of the artifact.
    #[must_use]
    pub const fn stem(self) -> &'static str {
        match self {
            Self::LossAndMetrics => "loss_and_metrics",
            Self::EntropyScores => "entropy_scores",
        }
    }

    /// File name including the record extension.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.{RECORD_EXTENSION}", self.stem())
    }
}

/// Location of one record: a (path, regime, run) triple plus the artifact kind.
///
/// Resolves to `{path}/{regime}/{run}/{artifact}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordLocation {
    path: String,
    regime: Regime,
    run: usize,
    artifact: Artifact,
}

impl RecordLocation {
    /// Create a new record location.
    #[must_use]
    pub fn new(path: impl Into<String>, regime: Regime, run: usize, artifact: Artifact) -> Self {
        Self {
            path: path.into(),
            regime,
            run,
            artifact,
        }
    }

    /// Get the path identifier.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the regime.
    #[must_use]
    pub const fn regime(&self) -> Regime {
        self.regime
    }

    /// Get the run index.
    #[must_use]
    pub const fn run(&self) -> usize {
        self.run
    }

    /// Get the artifact kind.
    #[must_use]
    pub const fn artifact(&self) -> Artifact {
        self.artifact
    }

    /// Relative filesystem path of the record.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.path)
            .join(self.regime.dir_name())
            .join(self.run.to_string())
            .join(self.artifact.file_name())
    }
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.path,
            self.regime,
            self.run,
            self.artifact.file_name()
        )
    }
}
