//! Path Aggregator - top-level entry points
//!
//! Both pipelines share one shape: for every path, the Run Aggregator
//! produces one value per run; the per-path lists are then assembled into a
//! rectangular [`ResultArray`] per metric.
//!
//! ```text
//! paths ──> accuracy_runs / entropy_runs (per path)
//!               │
//!               └──> ResultArray::from_series / from_scalars (per metric)
//!                        │
//!                        └──> ResultTable
//! ```
//!
//! Aggregation is all-or-nothing: the first failing path (in path order)
//! aborts the call. Each call is a pure function of its inputs and the
//! record store.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use experiment_results::aggregate::{load_accuracies, ScanParams};
//! use experiment_results::record::FsRecordStore;
//! use experiment_results::MetricName;
//!
//! let store = FsRecordStore::with_root("results");
//! let params = ScanParams::builder().n_runs(5).context_unaware(true).build()?;
//!
//! let table = load_accuracies(&store, &["dim(3,4)", "dim(4,4)"], &params)?;
//! for (metric, array) in table.iter() {
//!     println!("{}: {:?}", metric.name(), array.shape());
//! }
//! # Ok::<(), experiment_results::Error>(())
//! ```

mod metric;
mod params;
mod run;
mod table;

pub use metric::{AccuracyFamily, AccuracyMetric, EntropyMetric, MetricName};
pub use params::{ScanParams, ScanParamsBuilder};
pub use run::{accuracy_runs, entropy_runs, RunAccuracies};
pub use table::{ResultArray, ResultTable};

use crate::record::RecordStore;
use crate::Result;
use std::collections::BTreeMap;
use tracing::info;

/// Result table of the accuracy pipeline.
pub type AccuracyTable = ResultTable<AccuracyMetric>;

/// Result table of the entropy pipeline.
pub type EntropyTable = ResultTable<EntropyMetric>;

/// Aggregate accuracy and message length metrics of every run of every path.
///
/// The returned table always holds all ten accuracy metrics. Only the five
/// of the active regime are populated; the other five are empty arrays.
///
/// # Errors
///
/// `InvalidInput` for invalid parameters; otherwise the first
/// `StorageError`, `MissingKey`, `InvalidField` or `ShapeMismatch`
/// encountered.
pub fn load_accuracies<S, P>(store: &S, paths: &[P], params: &ScanParams) -> Result<AccuracyTable>
where
    S: RecordStore + ?Sized,
    P: AsRef<str>,
{
    params.validate()?;
    let paths = owned_paths(paths);
    info!(
        paths = paths.len(),
        runs = params.n_runs(),
        epochs = params.n_epochs(),
        val_steps = params.val_steps(),
        regime = %params.regime(),
        "aggregating accuracies"
    );

    let per_path = map_paths(&paths, |path| accuracy_runs(store, path, params))?;

    let arrays = AccuracyMetric::ALL
        .into_iter()
        .map(|metric| {
            let array = if metric.regime() == params.regime() {
                accuracy_array(metric, &paths, &per_path, params)?
            } else {
                ResultArray::empty()
            };
            Ok((metric, array))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    info!(paths = paths.len(), "accuracy aggregation complete");
    Ok(ResultTable::new(paths, arrays))
}

/// Aggregate the nine entropy scores of every run of every path.
///
/// Only `n_runs` and the regime of `params` are used.
///
/// # Errors
///
/// `InvalidInput` for invalid parameters; otherwise the first
/// `StorageError`, `MissingKey` or `InvalidField` encountered.
pub fn load_entropies<S, P>(store: &S, paths: &[P], params: &ScanParams) -> Result<EntropyTable>
where
    S: RecordStore + ?Sized,
    P: AsRef<str>,
{
    params.validate()?;
    let paths = owned_paths(paths);
    info!(
        paths = paths.len(),
        runs = params.n_runs(),
        regime = %params.regime(),
        "aggregating entropy scores"
    );

    let per_path = map_paths(&paths, |path| entropy_runs(store, path, params))?;

    let arrays = EntropyMetric::ALL
        .into_iter()
        .map(|metric| {
            let collections: Vec<Vec<f64>> = per_path
                .iter()
                .map(|records| records.iter().map(|r| metric.score(r)).collect())
                .collect();
            Ok((metric, ResultArray::from_scalars(metric.name(), &paths, &collections)?))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    info!(paths = paths.len(), "entropy aggregation complete");
    Ok(ResultTable::new(paths, arrays))
}

fn accuracy_array(
    metric: AccuracyMetric,
    paths: &[String],
    per_path: &[Vec<RunAccuracies>],
    params: &ScanParams,
) -> Result<ResultArray> {
    let family = metric.family();
    let Some(expected) = family.expected_length(params) else {
        let collections: Vec<Vec<f64>> = per_path
            .iter()
            .map(|runs| runs.iter().map(RunAccuracies::test_acc).collect())
            .collect();
        return ResultArray::from_scalars(metric.name(), paths, &collections);
    };

    let collections: Vec<Vec<&[f64]>> = per_path
        .iter()
        .map(|runs| {
            runs.iter()
                .map(|run| run.curve(family).unwrap_or_default())
                .collect()
        })
        .collect();
    ResultArray::from_series(metric.name(), paths, &collections, expected)
}

fn owned_paths<P: AsRef<str>>(paths: &[P]) -> Vec<String> {
    paths.iter().map(|path| path.as_ref().to_string()).collect()
}

/// Run `f` for every path, keeping path order in results and errors.
#[cfg(not(feature = "rayon"))]
fn map_paths<T, F>(paths: &[String], f: F) -> Result<Vec<T>>
where
    F: Fn(&str) -> Result<T>,
{
    paths.iter().map(|path| f(path.as_str())).collect()
}

/// Run `f` for every path in parallel, keeping path order in results and errors.
#[cfg(feature = "rayon")]
fn map_paths<T, F>(paths: &[String], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&str) -> Result<T> + Sync,
{
    use rayon::prelude::*;

    let results: Vec<Result<T>> = paths.par_iter().map(|path| f(path.as_str())).collect();
    results.into_iter().collect()
}
