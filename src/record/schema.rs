//! Typed record views
//!
//! Each view pulls every key it needs out of a raw [`Record`] once, so a
//! schema mismatch between the training pipeline and this crate surfaces at
//! load time with the record location attached.

use super::{EpochSeries, Record, RecordLocation};
use crate::Result;

/// On-disk key of the train accuracy curve.
pub const TRAIN_ACC_KEY: &str = "metrics_train0";
/// On-disk key of the validation accuracy curve.
pub const VAL_ACC_KEY: &str = "metrics_test0";
/// On-disk key of the train message length curve.
pub const TRAIN_MESSAGE_LENGTH_KEY: &str = "metrics_train1";
/// On-disk key of the validation message length curve.
pub const VAL_MESSAGE_LENGTH_KEY: &str = "metrics_test1";
/// On-disk key of the final test accuracy.
pub const FINAL_TEST_ACC_KEY: &str = "final_test_acc";

/// Contents of a `loss_and_metrics` record.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyRecord {
    location: RecordLocation,
    train_acc: EpochSeries,
    val_acc: EpochSeries,
    train_message_lengths: EpochSeries,
    val_message_lengths: EpochSeries,
    final_test_acc: f64,
}

impl AccuracyRecord {
    /// Validate and extract the accuracy schema from a raw record.
    ///
    /// # Errors
    ///
    /// `MissingKey` or `InvalidField` on the first key that does not conform.
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            location: record.location().clone(),
            train_acc: record.series(TRAIN_ACC_KEY)?,
            val_acc: record.series(VAL_ACC_KEY)?,
            train_message_lengths: record.series(TRAIN_MESSAGE_LENGTH_KEY)?,
            val_message_lengths: record.series(VAL_MESSAGE_LENGTH_KEY)?,
            final_test_acc: record.scalar(FINAL_TEST_ACC_KEY)?,
        })
    }

    /// Get the location this record was loaded from.
    #[must_use]
    pub const fn location(&self) -> &RecordLocation {
        &self.location
    }

    /// Train accuracy per epoch.
    #[must_use]
    pub const fn train_acc(&self) -> &EpochSeries {
        &self.train_acc
    }

    /// Validation accuracy per validation step.
    #[must_use]
    pub const fn val_acc(&self) -> &EpochSeries {
        &self.val_acc
    }

    /// Mean train message length per epoch.
    #[must_use]
    pub const fn train_message_lengths(&self) -> &EpochSeries {
        &self.train_message_lengths
    }

    /// Mean validation message length per validation step.
    #[must_use]
    pub const fn val_message_lengths(&self) -> &EpochSeries {
        &self.val_message_lengths
    }

    /// Test accuracy after training.
    #[must_use]
    pub const fn final_test_acc(&self) -> f64 {
        self.final_test_acc
    }
}

/// One entropy measure under the three context conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionedScore {
    /// Score ignoring context.
    pub plain: f64,
    /// Score conditioned on context.
    pub context_dep: f64,
    /// Score over concept x context combinations.
    pub concept_x_context: f64,
}

impl ConditionedScore {
    fn from_record(record: &Record, base_key: &str) -> Result<Self> {
        Ok(Self {
            plain: record.scalar(base_key)?,
            context_dep: record.scalar(&format!("{base_key}_context_dep"))?,
            concept_x_context: record.scalar(&format!("{base_key}_concept_x_context"))?,
        })
    }
}

/// Contents of an `entropy_scores` record.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyRecord {
    location: RecordLocation,
    nmi: ConditionedScore,
    effectiveness: ConditionedScore,
    consistency: ConditionedScore,
}

impl EntropyRecord {
    /// Base key of the normalized mutual information scores.
    pub const NMI_KEY: &'static str = "normalized_mutual_info";
    /// Base key of the effectiveness scores.
    pub const EFFECTIVENESS_KEY: &'static str = "effectiveness";
    /// Base key of the consistency scores.
    pub const CONSISTENCY_KEY: &'static str = "consistency";

    /// Validate and extract the entropy schema from a raw record.
    ///
    /// # Errors
    ///
    /// `MissingKey` or `InvalidField` on the first key that does not conform.
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            location: record.location().clone(),
            nmi: ConditionedScore::from_record(record, Self::NMI_KEY)?,
            effectiveness: ConditionedScore::from_record(record, Self::EFFECTIVENESS_KEY)?,
            consistency: ConditionedScore::from_record(record, Self::CONSISTENCY_KEY)?,
        })
    }

    /// Get the location this record was loaded from.
    #[must_use]
    pub const fn location(&self) -> &RecordLocation {
        &self.location
    }

    /// Normalized mutual information.
    #[must_use]
    pub const fn nmi(&self) -> ConditionedScore {
        self.nmi
    }

    /// Effectiveness.
    #[must_use]
    pub const fn effectiveness(&self) -> ConditionedScore {
        self.effectiveness
    }

    /// Consistency.
    #[must_use]
    pub const fn consistency(&self) -> ConditionedScore {
        self.consistency
    }
}
