//! Scan parameters shared by the aggregation entry points

use crate::record::Regime;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parameters describing how the runs of every path were trained.
///
/// Defaults mirror the standard training setup: 5 runs, 300 epochs,
/// validation every 10 epochs, context-aware regime.
///
/// ## Example
///
/// ```rust
/// use experiment_results::aggregate::ScanParams;
/// use experiment_results::record::Regime;
///
/// let params = ScanParams::builder()
///     .n_runs(3)
///     .n_epochs(300)
///     .val_steps(10)
///     .context_unaware(true)
///     .build()?;
///
/// assert_eq!(params.val_length(), 30);
/// assert_eq!(params.regime(), Regime::ContextUnaware);
/// # Ok::<(), experiment_results::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanParams {
    n_runs: usize,
    n_epochs: usize,
    val_steps: usize,
    regime: Regime,
}

impl ScanParams {
    /// Default number of runs per path.
    pub const DEFAULT_RUNS: usize = 5;
    /// Default number of training epochs.
    pub const DEFAULT_EPOCHS: usize = 300;
    /// Default validation frequency in epochs.
    pub const DEFAULT_VAL_STEPS: usize = 10;

    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> ScanParamsBuilder {
        ScanParamsBuilder::default()
    }

    /// Parse parameters from a JSON document; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the document does not parse or fails
    /// [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("Failed to parse scan parameters: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Number of runs per path.
    #[must_use]
    pub const fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// Number of training epochs.
    #[must_use]
    pub const fn n_epochs(&self) -> usize {
        self.n_epochs
    }

    /// Validation frequency in epochs.
    #[must_use]
    pub const fn val_steps(&self) -> usize {
        self.val_steps
    }

    /// Active regime.
    #[must_use]
    pub const fn regime(&self) -> Regime {
        self.regime
    }

    /// Expected length of per-epoch curves.
    #[must_use]
    pub const fn train_length(&self) -> usize {
        self.n_epochs
    }

    /// Expected length of per-validation-step curves (`n_epochs / val_steps`).
    #[must_use]
    pub const fn val_length(&self) -> usize {
        match self.n_epochs.checked_div(self.val_steps) {
            Some(length) => length,
            None => 0,
        }
    }

    /// Check the parameters before any record is read.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if runs, epochs, or validation steps are zero.
    pub fn validate(&self) -> Result<()> {
        if self.n_runs == 0 {
            return Err(Error::InvalidInput("n_runs must be positive".to_string()));
        }
        if self.n_epochs == 0 {
            return Err(Error::InvalidInput("n_epochs must be positive".to_string()));
        }
        if self.val_steps == 0 {
            return Err(Error::InvalidInput("val_steps must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            n_runs: Self::DEFAULT_RUNS,
            n_epochs: Self::DEFAULT_EPOCHS,
            val_steps: Self::DEFAULT_VAL_STEPS,
            regime: Regime::ContextAware,
        }
    }
}

/// Builder for `ScanParams`.
#[derive(Debug, Default)]
pub struct ScanParamsBuilder {
    params: ScanParams,
}

impl ScanParamsBuilder {
    /// Set the number of runs per path.
    #[must_use]
    pub const fn n_runs(mut self, n_runs: usize) -> Self {
        self.params.n_runs = n_runs;
        self
    }

    /// Set the number of training epochs.
    #[must_use]
    pub const fn n_epochs(mut self, n_epochs: usize) -> Self {
        self.params.n_epochs = n_epochs;
        self
    }

    /// Set the validation frequency in epochs.
    #[must_use]
    pub const fn val_steps(mut self, val_steps: usize) -> Self {
        self.params.val_steps = val_steps;
        self
    }

    /// Set the regime.
    #[must_use]
    pub const fn regime(mut self, regime: Regime) -> Self {
        self.params.regime = regime;
        self
    }

    /// Select the regime from the boolean context-unaware flag.
    #[must_use]
    pub const fn context_unaware(self, context_unaware: bool) -> Self {
        self.regime(Regime::from_context_unaware(context_unaware))
    }

    /// Build and validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if runs, epochs, or validation steps are zero.
    pub fn build(self) -> Result<ScanParams> {
        self.params.validate()?;
        Ok(self.params)
    }
}
