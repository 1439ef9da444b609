//! Run Aggregator - loads and reconciles every run of one path

use super::metric::{AccuracyFamily, AccuracyMetric, MetricName};
use super::params::ScanParams;
use crate::reconcile::SeriesReconciler;
use crate::record::{
    AccuracyRecord, Artifact, EntropyRecord, EpochSeries, RecordLocation, RecordStore,
};
use crate::Result;

/// Reconciled accuracy metrics of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunAccuracies {
    train_acc: Vec<f64>,
    val_acc: Vec<f64>,
    test_acc: f64,
    train_message_lengths: Vec<f64>,
    val_message_lengths: Vec<f64>,
}

impl RunAccuracies {
    /// Reconcile every curve of an accuracy record against `params`.
    ///
    /// # Errors
    ///
    /// Propagates `ShapeMismatch` from strict reconciliation, named after
    /// the result table metric of the failing curve.
    pub fn reconcile(
        record: &AccuracyRecord,
        params: &ScanParams,
        reconciler: &SeriesReconciler,
    ) -> Result<Self> {
        let location = record.location();
        let curve = |family: AccuracyFamily, series: &EpochSeries| {
            let metric = AccuracyMetric::new(family, location.regime());
            let expected = family.expected_length(params).unwrap_or_default();
            reconciler.reconcile(series, expected, location, metric.name())
        };

        Ok(Self {
            train_acc: curve(AccuracyFamily::TrainAcc, record.train_acc())?,
            val_acc: curve(AccuracyFamily::ValAcc, record.val_acc())?,
            test_acc: record.final_test_acc(),
            train_message_lengths: curve(
                AccuracyFamily::TrainMessageLengths,
                record.train_message_lengths(),
            )?,
            val_message_lengths: curve(
                AccuracyFamily::ValMessageLengths,
                record.val_message_lengths(),
            )?,
        })
    }

    /// Curve of a family, `None` for the scalar test accuracy.
    #[must_use]
    pub fn curve(&self, family: AccuracyFamily) -> Option<&[f64]> {
        match family {
            AccuracyFamily::TrainAcc => Some(&self.train_acc),
            AccuracyFamily::ValAcc => Some(&self.val_acc),
            AccuracyFamily::TrainMessageLengths => Some(&self.train_message_lengths),
            AccuracyFamily::ValMessageLengths => Some(&self.val_message_lengths),
            AccuracyFamily::TestAcc => None,
        }
    }

    /// Final test accuracy.
    #[must_use]
    pub const fn test_acc(&self) -> f64 {
        self.test_acc
    }
}

/// Load and reconcile runs `0..n_runs` of `path` under the active regime.
///
/// Any failing run aborts the whole path; nothing partial is returned.
///
/// # Errors
///
/// Propagates `StorageError`, `MissingKey`, `InvalidField` and
/// `ShapeMismatch`, all carrying the path and run of the failing record.
pub fn accuracy_runs<S>(store: &S, path: &str, params: &ScanParams) -> Result<Vec<RunAccuracies>>
where
    S: RecordStore + ?Sized,
{
    let regime = params.regime();
    let reconciler = SeriesReconciler::for_regime(regime);

    (0..params.n_runs())
        .map(|run| {
            let location = RecordLocation::new(path, regime, run, Artifact::LossAndMetrics);
            let record = AccuracyRecord::from_record(&store.load(&location)?)?;
            RunAccuracies::reconcile(&record, params, &reconciler)
        })
        .collect()
}

/// Load the entropy scores of runs `0..n_runs` of `path` under the active regime.
///
/// # Errors
///
/// Propagates `StorageError`, `MissingKey` and `InvalidField`.
pub fn entropy_runs<S>(store: &S, path: &str, params: &ScanParams) -> Result<Vec<EntropyRecord>>
where
    S: RecordStore + ?Sized,
{
    (0..params.n_runs())
        .map(|run| {
            let location =
                RecordLocation::new(path, params.regime(), run, Artifact::EntropyScores);
            EntropyRecord::from_record(&store.load(&location)?)
        })
        .collect()
}
