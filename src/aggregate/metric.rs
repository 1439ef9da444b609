//! Enumerated metric names of the result tables

use super::params::ScanParams;
use crate::record::schema::EntropyRecord;
use crate::record::Regime;
use std::fmt;

/// A fixed, enumerated metric name usable as a result table key.
pub trait MetricName: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Every metric of this table kind, in table order.
    fn all() -> &'static [Self];

    /// Name of the metric in the result table.
    fn name(self) -> &'static str;

    /// Whether values are per-epoch curves (3 axes) rather than scalars (2 axes).
    fn is_curve(self) -> bool;

    /// Look a metric up by its table name.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|metric| metric.name() == name)
    }
}

/// Metric family of the accuracy pipeline, independent of regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccuracyFamily {
    /// Train accuracy per epoch.
    TrainAcc,
    /// Validation accuracy per validation step.
    ValAcc,
    /// Final test accuracy.
    TestAcc,
    /// Train message length per epoch.
    TrainMessageLengths,
    /// Validation message length per validation step.
    ValMessageLengths,
}

impl AccuracyFamily {
    /// Number of points a reconciled curve of this family must hold, `None`
    /// for the scalar test accuracy.
    #[must_use]
    pub const fn expected_length(self, params: &ScanParams) -> Option<usize> {
        match self {
            Self::TrainAcc | Self::TrainMessageLengths => Some(params.train_length()),
            Self::ValAcc | Self::ValMessageLengths => Some(params.val_length()),
            Self::TestAcc => None,
        }
    }
}

/// Result table keys of the accuracy pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccuracyMetric {
    /// `train_acc`
    TrainAcc,
    /// `val_acc`
    ValAcc,
    /// `test_acc`
    TestAcc,
    /// `train_message_lengths`
    TrainMessageLengths,
    /// `val_message_lengths`
    ValMessageLengths,
    /// `cu_train_acc`
    CuTrainAcc,
    /// `cu_val_acc`
    CuValAcc,
    /// `cu_test_acc`
    CuTestAcc,
    /// `cu_train_message_lengths`
    CuTrainMessageLengths,
    /// `cu_val_message_lengths`
    CuValMessageLengths,
}

impl AccuracyMetric {
    /// All accuracy metrics, context-aware first.
    pub const ALL: [Self; 10] = [
        Self::TrainAcc,
        Self::ValAcc,
        Self::TestAcc,
        Self::TrainMessageLengths,
        Self::ValMessageLengths,
        Self::CuTrainAcc,
        Self::CuValAcc,
        Self::CuTestAcc,
        Self::CuTrainMessageLengths,
        Self::CuValMessageLengths,
    ];

    /// Metric of `family` populated by runs of `regime`.
    #[must_use]
    pub const fn new(family: AccuracyFamily, regime: Regime) -> Self {
        match (regime, family) {
            (Regime::ContextAware, AccuracyFamily::TrainAcc) => Self::TrainAcc,
            (Regime::ContextAware, AccuracyFamily::ValAcc) => Self::ValAcc,
            (Regime::ContextAware, AccuracyFamily::TestAcc) => Self::TestAcc,
            (Regime::ContextAware, AccuracyFamily::TrainMessageLengths) => {
                Self::TrainMessageLengths
            }
            (Regime::ContextAware, AccuracyFamily::ValMessageLengths) => Self::ValMessageLengths,
            (Regime::ContextUnaware, AccuracyFamily::TrainAcc) => Self::CuTrainAcc,
            (Regime::ContextUnaware, AccuracyFamily::ValAcc) => Self::CuValAcc,
            (Regime::ContextUnaware, AccuracyFamily::TestAcc) => Self::CuTestAcc,
            (Regime::ContextUnaware, AccuracyFamily::TrainMessageLengths) => {
                Self::CuTrainMessageLengths
            }
            (Regime::ContextUnaware, AccuracyFamily::ValMessageLengths) => {
                Self::CuValMessageLengths
            }
        }
    }

    /// Regime whose runs populate this metric.
    #[must_use]
    pub const fn regime(self) -> Regime {
        match self {
            Self::TrainAcc
            | Self::ValAcc
            | Self::TestAcc
            | Self::TrainMessageLengths
            | Self::ValMessageLengths => Regime::ContextAware,
            Self::CuTrainAcc
            | Self::CuValAcc
            | Self::CuTestAcc
            | Self::CuTrainMessageLengths
            | Self::CuValMessageLengths => Regime::ContextUnaware,
        }
    }

    /// Regime-independent family.
    #[must_use]
    pub const fn family(self) -> AccuracyFamily {
        match self {
            Self::TrainAcc | Self::CuTrainAcc => AccuracyFamily::TrainAcc,
            Self::ValAcc | Self::CuValAcc => AccuracyFamily::ValAcc,
            Self::TestAcc | Self::CuTestAcc => AccuracyFamily::TestAcc,
            Self::TrainMessageLengths | Self::CuTrainMessageLengths => {
                AccuracyFamily::TrainMessageLengths
            }
            Self::ValMessageLengths | Self::CuValMessageLengths => {
                AccuracyFamily::ValMessageLengths
            }
        }
    }
}

impl MetricName for AccuracyMetric {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(self) -> &'static str {
        match self {
            Self::TrainAcc => "train_acc",
            Self::ValAcc => "val_acc",
            Self::TestAcc => "test_acc",
            Self::TrainMessageLengths => "train_message_lengths",
            Self::ValMessageLengths => "val_message_lengths",
            Self::CuTrainAcc => "cu_train_acc",
            Self::CuValAcc => "cu_val_acc",
            Self::CuTestAcc => "cu_test_acc",
            Self::CuTrainMessageLengths => "cu_train_message_lengths",
            Self::CuValMessageLengths => "cu_val_message_lengths",
        }
    }

    fn is_curve(self) -> bool {
        self.family() != AccuracyFamily::TestAcc
    }
}

impl fmt::Display for AccuracyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result table keys of the entropy pipeline: three measures under three
/// context conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntropyMetric {
    /// `NMI`
    Nmi,
    /// `effectiveness`
    Effectiveness,
    /// `consistency`
    Consistency,
    /// `NMI_context_dep`
    NmiContextDep,
    /// `effectiveness_context_dep`
    EffectivenessContextDep,
    /// `consistency_context_dep`
    ConsistencyContextDep,
    /// `NMI_concept_x_context`
    NmiConceptXContext,
    /// `effectiveness_concept_x_context`
    EffectivenessConceptXContext,
    /// `consistency_concept_x_context`
    ConsistencyConceptXContext,
}

impl EntropyMetric {
    /// All entropy metrics.
    pub const ALL: [Self; 9] = [
        Self::Nmi,
        Self::Effectiveness,
        Self::Consistency,
        Self::NmiContextDep,
        Self::EffectivenessContextDep,
        Self::ConsistencyContextDep,
        Self::NmiConceptXContext,
        Self::EffectivenessConceptXContext,
        Self::ConsistencyConceptXContext,
    ];

    /// Pick this metric's score out of an entropy record.
    #[must_use]
    pub const fn score(self, record: &EntropyRecord) -> f64 {
        match self {
            Self::Nmi => record.nmi().plain,
            Self::Effectiveness => record.effectiveness().plain,
            Self::Consistency => record.consistency().plain,
            Self::NmiContextDep => record.nmi().context_dep,
            Self::EffectivenessContextDep => record.effectiveness().context_dep,
            Self::ConsistencyContextDep => record.consistency().context_dep,
            Self::NmiConceptXContext => record.nmi().concept_x_context,
            Self::EffectivenessConceptXContext => record.effectiveness().concept_x_context,
            Self::ConsistencyConceptXContext => record.consistency().concept_x_context,
        }
    }
}

impl MetricName for EntropyMetric {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(self) -> &'static str {
        match self {
            Self::Nmi => "NMI",
            Self::Effectiveness => "effectiveness",
            Self::Consistency => "consistency",
            Self::NmiContextDep => "NMI_context_dep",
            Self::EffectivenessContextDep => "effectiveness_context_dep",
            Self::ConsistencyContextDep => "consistency_context_dep",
            Self::NmiConceptXContext => "NMI_concept_x_context",
            Self::EffectivenessConceptXContext => "effectiveness_concept_x_context",
            Self::ConsistencyConceptXContext => "consistency_concept_x_context",
        }
    }

    fn is_curve(self) -> bool {
        false
    }
}

impl fmt::Display for EntropyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_names_round_trip() {
        for metric in AccuracyMetric::ALL {
            assert_eq!(AccuracyMetric::from_name(metric.name()), Some(metric));
        }
        assert_eq!(AccuracyMetric::from_name("nope"), None);
    }

    #[test]
    fn test_accuracy_regime_split() {
        let context_unaware: Vec<_> = AccuracyMetric::ALL
            .into_iter()
            .filter(|m| m.regime() == Regime::ContextUnaware)
            .collect();
        assert_eq!(context_unaware.len(), 5);
        assert!(context_unaware.iter().all(|m| m.name().starts_with("cu_")));
    }

    #[test]
    fn test_accuracy_metric_from_parts() {
        for metric in AccuracyMetric::ALL {
            assert_eq!(AccuracyMetric::new(metric.family(), metric.regime()), metric);
        }
    }

    #[test]
    fn test_family_expected_lengths() {
        let params = ScanParams::builder().n_epochs(300).val_steps(10).build().unwrap();
        assert_eq!(AccuracyFamily::TrainAcc.expected_length(&params), Some(300));
        assert_eq!(AccuracyFamily::ValMessageLengths.expected_length(&params), Some(30));
        assert_eq!(AccuracyFamily::TestAcc.expected_length(&params), None);
    }

    #[test]
    fn test_test_acc_is_scalar() {
        assert!(!AccuracyMetric::CuTestAcc.is_curve());
        assert!(AccuracyMetric::ValMessageLengths.is_curve());
    }

    #[test]
    fn test_entropy_names() {
        let names: Vec<_> = EntropyMetric::ALL.into_iter().map(MetricName::name).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"NMI_concept_x_context"));
        assert!(names.contains(&"consistency_context_dep"));
        assert_eq!(EntropyMetric::from_name("NMI"), Some(EntropyMetric::Nmi));
    }
}
