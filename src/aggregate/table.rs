//! Result tables - rectangular arrays keyed by metric name

use super::metric::MetricName;
use crate::reconcile::validate_shape;
use crate::{Error, Result};
use ndarray::{Array2, Array3, ArrayD, ArrayViewD, Axis, IxDyn, ShapeError};
use std::collections::BTreeMap;

/// Rectangular `f64` array over `ndarray::ArrayD`.
///
/// Axes are `(path, run, epoch)` for curves, `(path, run)` for scalars, and
/// `(0,)` for a metric the call did not populate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultArray {
    data: ArrayD<f64>,
}

impl ResultArray {
    /// Array of a metric not populated by the call.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(&[0])),
        }
    }

    /// Assemble `(path, run)` scalars.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `paths` and `collections` disagree in length
    /// or paths hold different run counts.
    pub fn from_scalars(metric: &str, paths: &[String], collections: &[Vec<f64>]) -> Result<Self> {
        if collections.is_empty() {
            return Ok(Self::empty());
        }
        check_path_count(metric, paths, collections.len())?;

        let runs = collections[0].len();
        let mut values = Vec::with_capacity(collections.len() * runs);
        for (path, run_collection) in paths.iter().zip(collections) {
            check_run_count(metric, path, run_collection.len(), runs)?;
            values.extend_from_slice(run_collection);
        }

        let data = Array2::from_shape_vec((collections.len(), runs), values)
            .map_err(|e| layout_error(metric, &e))?;
        Ok(Self {
            data: data.into_dyn(),
        })
    }

    /// Assemble `(path, run, epoch)` curves of `epochs` points each.
    ///
    /// `epochs` is the length declared by the scan parameters, so the run
    /// that deviates from it is the one reported, wherever it sits.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` naming path, run and metric for the first curve
    /// whose length differs from `epochs`, or `InvalidInput` on inconsistent
    /// run counts.
    pub fn from_series<R: AsRef<[f64]>>(
        metric: &str,
        paths: &[String],
        collections: &[Vec<R>],
        epochs: usize,
    ) -> Result<Self> {
        if collections.is_empty() {
            return Ok(Self::empty());
        }
        check_path_count(metric, paths, collections.len())?;

        let runs = collections[0].len();
        let mut values = Vec::with_capacity(collections.len() * runs * epochs);

        for (path, run_collection) in paths.iter().zip(collections) {
            check_run_count(metric, path, run_collection.len(), runs)?;
            for (run, series) in run_collection.iter().enumerate() {
                let series = series.as_ref();
                validate_shape(series.len(), epochs, path, run, metric)?;
                values.extend_from_slice(series);
            }
        }

        let data = Array3::from_shape_vec((collections.len(), runs, epochs), values)
            .map_err(|e| layout_error(metric, &e))?;
        Ok(Self {
            data: data.into_dyn(),
        })
    }

    /// Underlying n-dimensional array.
    #[must_use]
    pub const fn as_array(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Read-only view of the array.
    #[must_use]
    pub fn view(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    /// Array shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at a full multi-index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.data.ndim() {
            return None;
        }
        self.data.get(index).copied()
    }

    /// Innermost lane at `(path, run)`: the curve of a 3-axis array, or the
    /// single scalar of a 2-axis array.
    #[must_use]
    pub fn lane(&self, path: usize, run: usize) -> Option<&[f64]> {
        let [paths, runs, ..] = *self.data.shape() else {
            return None;
        };
        if path >= paths || run >= runs {
            return None;
        }
        self.view()
            .index_axis_move(Axis(0), path)
            .index_axis_move(Axis(0), run)
            .to_slice()
    }
}

fn layout_error(metric: &str, error: &ShapeError) -> Error {
    Error::InvalidInput(format!("{metric}: cannot lay out result array: {error}"))
}

fn check_path_count(metric: &str, paths: &[String], collections: usize) -> Result<()> {
    if paths.len() == collections {
        return Ok(());
    }
    Err(Error::InvalidInput(format!(
        "{metric}: {collections} path collections for {} paths",
        paths.len()
    )))
}

fn check_run_count(metric: &str, path: &str, observed: usize, expected: usize) -> Result<()> {
    if observed == expected {
        return Ok(());
    }
    Err(Error::InvalidInput(format!(
        "{metric}: path '{path}' holds {observed} runs, expected {expected}"
    )))
}

/// Mapping from metric name to its reconciled array, plus the ordered path
/// identifiers that index the first axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<M: MetricName> {
    paths: Vec<String>,
    arrays: BTreeMap<M, ResultArray>,
}

impl<M: MetricName> ResultTable<M> {
    /// Create a table from assembled arrays.
    #[must_use]
    pub const fn new(paths: Vec<String>, arrays: BTreeMap<M, ResultArray>) -> Self {
        Self { paths, arrays }
    }

    /// Path identifiers along the first axis.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Array of a metric.
    #[must_use]
    pub fn get(&self, metric: M) -> Option<&ResultArray> {
        self.arrays.get(&metric)
    }

    /// Array of a metric looked up by its table name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ResultArray> {
        M::from_name(name).and_then(|metric| self.get(metric))
    }

    /// Metrics present in the table, in table order.
    pub fn metrics(&self) -> impl Iterator<Item = M> + '_ {
        self.arrays.keys().copied()
    }

    /// `(metric, array)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (M, &ResultArray)> {
        self.arrays.iter().map(|(metric, array)| (*metric, array))
    }

    /// Number of metrics in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Check if the table holds no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::metric::EntropyMetric;

    fn paths(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    #[test]
    fn test_scalars_shape_and_order() {
        let array =
            ResultArray::from_scalars("test_acc", &paths(2), &[vec![1.0, 2.0], vec![3.0, 4.0]])
                .unwrap();
        assert_eq!(array.shape(), &[2, 2]);
        assert_eq!(array.get(&[1, 0]), Some(3.0));
        assert_eq!(array.lane(0, 1), Some(&[2.0][..]));
        assert_eq!(array.get(&[2, 0]), None);
    }

    #[test]
    fn test_series_shape_and_lanes() {
        let collections = vec![
            vec![vec![0.0, 0.1, 0.2], vec![1.0, 1.1, 1.2]],
            vec![vec![2.0, 2.1, 2.2], vec![3.0, 3.1, 3.2]],
        ];
        let array = ResultArray::from_series("val_acc", &paths(2), &collections, 3).unwrap();
        assert_eq!(array.shape(), &[2, 2, 3]);
        assert_eq!(array.ndim(), 3);
        assert_eq!(array.len(), 12);
        assert_eq!(array.lane(1, 0), Some(&[2.0, 2.1, 2.2][..]));
        assert_eq!(array.get(&[1, 1, 2]), Some(3.2));
        assert_eq!(array.get(&[0, 0]), None);
        assert_eq!(array.as_array().index_axis(Axis(0), 0).shape(), &[2, 3]);
    }

    #[test]
    fn test_series_rejects_ragged_runs() {
        let collections = vec![vec![vec![0.0, 0.1]], vec![vec![1.0, 1.1, 1.2]]];
        match ResultArray::from_series("val_acc", &paths(2), &collections, 2).unwrap_err() {
            Error::ShapeMismatch {
                path,
                run,
                metric,
                observed,
                expected,
            } => {
                assert_eq!(path, "p1");
                assert_eq!(run, 0);
                assert_eq!(metric, "val_acc");
                assert_eq!(observed, 3);
                assert_eq!(expected, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_series_blames_first_run_when_it_deviates() {
        let collections = vec![vec![vec![0.0, 0.1, 0.2], vec![1.0, 1.1], vec![2.0, 2.1]]];
        match ResultArray::from_series("val_acc", &paths(1), &collections, 2).unwrap_err() {
            Error::ShapeMismatch {
                run,
                observed,
                expected,
                ..
            } => {
                assert_eq!(run, 0);
                assert_eq!(observed, 3);
                assert_eq!(expected, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_collections() {
        let array = ResultArray::from_series::<Vec<f64>>("val_acc", &[], &[], 30).unwrap();
        assert_eq!(array, ResultArray::empty());
        assert_eq!(array.shape(), &[0]);
        assert!(array.is_empty());
        assert_eq!(array.lane(0, 0), None);
    }

    #[test]
    fn test_path_count_mismatch() {
        assert!(matches!(
            ResultArray::from_scalars("NMI", &paths(1), &[vec![1.0], vec![2.0]]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_table_lookup_by_name() {
        let mut arrays = BTreeMap::new();
        arrays.insert(
            EntropyMetric::Nmi,
            ResultArray::from_scalars("NMI", &paths(1), &[vec![0.5]]).unwrap(),
        );
        let table = ResultTable::new(paths(1), arrays);

        assert_eq!(table.len(), 1);
        assert_eq!(table.paths(), &["p0".to_string()]);
        assert!(table.get_by_name("NMI").is_some());
        assert!(table.get_by_name("consistency").is_none());
        assert_eq!(table.metrics().collect::<Vec<_>>(), vec![EntropyMetric::Nmi]);
    }
}
