//! Error types for experiment-results
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Aggregation error types
///
/// Every variant is fatal to the aggregation call that produced it. There is
/// no partial-result mode.
#[derive(Error, Debug)]
pub enum Error {
    /// Record location absent, unreadable, or not a decodable record
    #[error("Storage error at {location}: {reason}\nThe run is missing or corrupt; all runs of a path must be present")]
    StorageError {
        /// Resolved record location
        location: String,
        /// Underlying cause
        reason: String,
    },

    /// Reconciled series length disagrees with the expected count
    #[error(
        "Shape mismatch for '{metric}' in path '{path}', run {run}: observed {observed} values, expected {expected}\n\
         The stored results don't match the scan parameters. Check the number of epochs and validation steps of this run."
    )]
    ShapeMismatch {
        /// Path identifier
        path: String,
        /// Run index within the path
        run: usize,
        /// Result table metric name (e.g. `cu_train_acc`)
        metric: String,
        /// Observed length
        observed: usize,
        /// Expected length
        expected: usize,
    },

    /// Record lacks a key this crate expects (schema mismatch)
    #[error("Missing key '{key}' in record {location}")]
    MissingKey {
        /// Resolved record location
        location: String,
        /// Missing key
        key: String,
    },

    /// Record key holds a value of the wrong kind
    #[error("Invalid value for key '{key}' in record {location}: {reason}")]
    InvalidField {
        /// Resolved record location
        location: String,
        /// Offending key
        key: String,
        /// What was wrong with the value
        reason: String,
    },

    /// Invalid scan parameters or policy configuration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
