//! Series reconciliation
//!
//! **Problem**: Stored curves are keyed by epoch in whatever order the
//! record store yields, and some historical runs logged validation twice
//! as often as configured.
//!
//! **Solution**: Sort by epoch, then align the sampling density to the
//! caller's expected count through an explicit [`SamplingPolicy`].
//!
//! Two validation modes exist and stay distinct:
//! - [`Validation::Strict`] (context-unaware runs): the reconciled length must
//!   equal the expected count, otherwise `ShapeMismatch`.
//! - [`Validation::Lenient`] (context-aware runs): the reconciled series is
//!   returned as-is; unresolved mismatches are logged, not raised.
//!
//! ## Example
//!
//! ```rust
//! use experiment_results::reconcile::{Correction, SamplingPolicy};
//!
//! let policy = SamplingPolicy::historical();
//! let doubled: Vec<f64> = (0..60).map(f64::from).collect();
//!
//! let (values, correction) = policy.apply(doubled, 30);
//! assert_eq!(correction, Correction::Subsampled { ratio: 2 });
//! assert_eq!(values.len(), 30);
//! assert_eq!(values[1], 2.0);
//! ```

use crate::record::{EpochSeries, RecordLocation, Regime};
use crate::{Error, Result};
use tracing::{debug, warn};

/// Outcome of aligning a series to its expected length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Series already had the expected length.
    None,
    /// Series was oversampled by a supported ratio and strided down.
    Subsampled {
        /// Stride applied, starting at index 0.
        ratio: usize,
    },
    /// Length differs from the expectation and no supported ratio explains it.
    Unresolved {
        /// Observed length.
        observed: usize,
        /// Expected length.
        expected: usize,
    },
}

/// Table of supported oversampling ratios.
///
/// Version 1 (historical) supports exactly one ratio: validation logged every
/// 5 epochs where 10 was configured, giving twice the expected points. Any
/// other ratio is reported as [`Correction::Unresolved`] so new schema drift
/// never silently misaligns data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingPolicy {
    ratios: Vec<usize>,
}

impl SamplingPolicy {
    /// Ratios of the historical policy.
    pub const HISTORICAL_RATIOS: [usize; 1] = [2];

    /// Policy correcting the historical doubled-sampling runs.
    #[must_use]
    pub fn historical() -> Self {
        Self {
            ratios: Self::HISTORICAL_RATIOS.to_vec(),
        }
    }

    /// Policy applying no corrections at all.
    #[must_use]
    pub const fn exact() -> Self {
        Self { ratios: Vec::new() }
    }

    /// Policy with a custom ratio table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any ratio is below 2.
    pub fn with_ratios(ratios: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut ratios: Vec<usize> = ratios.into_iter().collect();
        if let Some(bad) = ratios.iter().find(|&&ratio| ratio < 2) {
            return Err(Error::InvalidInput(format!(
                "sampling ratio must be at least 2, got {bad}"
            )));
        }
        ratios.sort_unstable();
        ratios.dedup();
        Ok(Self { ratios })
    }

    /// Supported ratios, ascending.
    #[must_use]
    pub fn ratios(&self) -> &[usize] {
        &self.ratios
    }

    /// Decide how a series of `observed` points maps onto `expected` points.
    #[must_use]
    pub fn correction(&self, observed: usize, expected: usize) -> Correction {
        if observed == expected {
            return Correction::None;
        }
        if expected > 0 {
            if let Some(&ratio) = self
                .ratios
                .iter()
                .find(|&&ratio| expected.checked_mul(ratio) == Some(observed))
            {
                return Correction::Subsampled { ratio };
            }
        }
        Correction::Unresolved { observed, expected }
    }

    /// Apply the correction for `values` against `expected`.
    ///
    /// Unresolved series are returned unchanged.
    #[must_use]
    pub fn apply(&self, values: Vec<f64>, expected: usize) -> (Vec<f64>, Correction) {
        let correction = self.correction(values.len(), expected);
        let values = match correction {
            Correction::Subsampled { ratio } => values.into_iter().step_by(ratio).collect(),
            Correction::None | Correction::Unresolved { .. } => values,
        };
        (values, correction)
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::historical()
    }
}

/// Length validation applied after correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Reconciled length must equal the expected count.
    Strict,
    /// Reconciled series is accepted whatever its length.
    Lenient,
}

impl Validation {
    /// Validation mode used for runs of `regime`.
    ///
    /// Context-aware runs are lenient, context-unaware runs strict. The
    /// asymmetry is kept as observed in the stored experiments.
    #[must_use]
    pub const fn for_regime(regime: Regime) -> Self {
        match regime {
            Regime::ContextAware => Self::Lenient,
            Regime::ContextUnaware => Self::Strict,
        }
    }
}

/// Shape Validator: assert a series has the expected length.
///
/// # Errors
///
/// Returns `ShapeMismatch` naming path, run and result table metric if
/// `observed != expected`.
pub fn validate_shape(
    observed: usize,
    expected: usize,
    path: &str,
    run: usize,
    metric: &str,
) -> Result<()> {
    if observed == expected {
        return Ok(());
    }
    Err(Error::ShapeMismatch {
        path: path.to_string(),
        run,
        metric: metric.to_string(),
        observed,
        expected,
    })
}

/// Turns epoch-indexed sub-mappings into reconciled time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesReconciler {
    policy: SamplingPolicy,
    validation: Validation,
}

impl SeriesReconciler {
    /// Create a reconciler from an explicit policy and validation mode.
    #[must_use]
    pub const fn new(policy: SamplingPolicy, validation: Validation) -> Self {
        Self { policy, validation }
    }

    /// Historical policy with the validation mode of `regime`.
    #[must_use]
    pub fn for_regime(regime: Regime) -> Self {
        Self::new(SamplingPolicy::historical(), Validation::for_regime(regime))
    }

    /// Get the sampling policy.
    #[must_use]
    pub const fn policy(&self) -> &SamplingPolicy {
        &self.policy
    }

    /// Get the validation mode.
    #[must_use]
    pub const fn validation(&self) -> Validation {
        self.validation
    }

    /// Sort `series` by epoch, correct its sampling density, and validate it.
    ///
    /// `metric` is the result table name the series feeds; it is what a
    /// `ShapeMismatch` reports.
    ///
    /// # Errors
    ///
    /// Under strict validation, returns `ShapeMismatch` when the corrected
    /// length differs from `expected`. Lenient validation never fails.
    pub fn reconcile(
        &self,
        series: &EpochSeries,
        expected: usize,
        location: &RecordLocation,
        metric: &str,
    ) -> Result<Vec<f64>> {
        let (values, correction) = self.policy.apply(series.sorted_values(), expected);

        match correction {
            Correction::None => {}
            Correction::Subsampled { ratio } => {
                debug!(
                    record = %location,
                    key = series.key(),
                    metric,
                    ratio,
                    "oversampled series strided down"
                );
            }
            Correction::Unresolved { observed, expected } => {
                if self.validation == Validation::Lenient {
                    warn!(
                        record = %location,
                        key = series.key(),
                        metric,
                        observed,
                        expected,
                        "series length does not match scan parameters, kept as-is"
                    );
                }
            }
        }

        if self.validation == Validation::Strict {
            validate_shape(
                values.len(),
                expected,
                location.path(),
                location.run(),
                metric,
            )?;
        }

        Ok(values)
    }
}
