//! # experiment-results: Per-Run Result Aggregation
//!
//! Collects per-run experiment records (accuracy curves, message length
//! curves, entropy scores) for several experiment configurations ("paths")
//! into rectangular arrays ready for statistical analysis and plotting.
//!
//! Nothing here computes a metric. The crate reads, reorders, reconciles and
//! validates what the training pipeline already stored, and fails loudly
//! with path/run context when a run does not fit the scan parameters.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Shape mismatches stop the aggregation instead of being padded or truncated
//! - **Poka-Yoke**: Records are validated against a typed schema at load time
//! - **Genchi Genbutsu**: Sampling corrections come from an explicit ratio table observed in stored runs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use experiment_results::aggregate::{load_accuracies, AccuracyMetric, ScanParams};
//! use experiment_results::record::FsRecordStore;
//!
//! let store = FsRecordStore::new();
//! let params = ScanParams::builder().n_runs(3).n_epochs(300).val_steps(10).build()?;
//!
//! let table = load_accuracies(&store, &["results/dim(3,4)", "results/dim(3,8)"], &params)?;
//! let val_acc = table.get(AccuracyMetric::ValAcc).expect("always present");
//! assert_eq!(val_acc.shape(), &[2, 3, 30]);
//! # Ok::<(), experiment_results::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod record;

pub use aggregate::{
    load_accuracies, load_entropies, AccuracyMetric, AccuracyTable, EntropyMetric, EntropyTable,
    MetricName, ResultArray, ResultTable, ScanParams,
};
pub use error::{Error, Result};
