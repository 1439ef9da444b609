//! End-to-end aggregation scenarios over records on disk
//!
//! Each test lays out `{root}/{path}/{regime}/{run}/{artifact}.json` in a
//! private temp directory and aggregates it through `FsRecordStore`.

use experiment_results::aggregate::{
    load_accuracies, load_entropies, AccuracyMetric, EntropyMetric, MetricName, ScanParams,
};
use experiment_results::record::{Artifact, FsRecordStore, RecordLocation, Regime};
use experiment_results::Error;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::PathBuf;

/// Temp directory removed on drop
struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "experiment_results_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn store(&self) -> FsRecordStore {
        FsRecordStore::with_root(&self.root)
    }

    fn write(&self, location: &RecordLocation, value: &Value) {
        self.write_raw(location, &serde_json::to_vec(value).unwrap());
    }

    fn write_raw(&self, location: &RecordLocation, bytes: &[u8]) {
        let file = self.store().resolve(location);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, bytes).unwrap();
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Epoch-indexed curve where value = seed + epoch, written in reverse epoch order
#[allow(clippy::cast_precision_loss)]
fn curve(len: usize, seed: f64) -> Value {
    let entries: Map<String, Value> = (0..len)
        .rev()
        .map(|epoch| (epoch.to_string(), json!(seed + epoch as f64)))
        .collect();
    Value::Object(entries)
}

fn accuracy_record(train_len: usize, val_len: usize, seed: f64) -> Value {
    json!({
        "metrics_train0": curve(train_len, seed),
        "metrics_test0": curve(val_len, seed + 1000.0),
        "metrics_train1": curve(train_len, seed + 2000.0),
        "metrics_test1": curve(val_len, seed + 3000.0),
        "final_test_acc": seed
    })
}

#[allow(clippy::cast_precision_loss)]
fn entropy_record(seed: f64) -> Value {
    let mut fields = Map::new();
    for (i, base) in ["normalized_mutual_info", "effectiveness", "consistency"]
        .iter()
        .enumerate()
    {
        let base_value = seed + i as f64;
        fields.insert((*base).to_string(), json!(base_value));
        fields.insert(format!("{base}_context_dep"), json!(base_value + 0.1));
        fields.insert(format!("{base}_concept_x_context"), json!(base_value + 0.2));
    }
    Value::Object(fields)
}

#[allow(clippy::cast_precision_loss)]
fn seed_for(path: usize, run: usize) -> f64 {
    (path * 10 + run) as f64
}

// =============================================================================
// Accuracy pipeline
// =============================================================================

#[test]
fn test_doubled_validation_curves_are_halved() {
    let ws = Workspace::new("doubled");
    let paths = ["p0", "p1"];
    for (p, path) in paths.iter().enumerate() {
        for run in 0..3 {
            let location =
                RecordLocation::new(*path, Regime::ContextAware, run, Artifact::LossAndMetrics);
            ws.write(&location, &accuracy_record(300, 60, seed_for(p, run)));
        }
    }
    let params = ScanParams::builder()
        .n_runs(3)
        .n_epochs(300)
        .val_steps(10)
        .build()
        .unwrap();

    let table = load_accuracies(&ws.store(), &paths, &params).unwrap();

    let val_acc = table.get(AccuracyMetric::ValAcc).unwrap();
    assert_eq!(val_acc.shape(), &[2, 3, 30]);
    for p in 0..2 {
        for run in 0..3 {
            let lane = val_acc.lane(p, run).unwrap();
            let base = seed_for(p, run) + 1000.0;
            let expected: Vec<f64> = (0..30).map(|i| base + f64::from(2 * i)).collect();
            assert_eq!(lane, expected.as_slice());
        }
    }

    assert_eq!(table.get(AccuracyMetric::TrainAcc).unwrap().shape(), &[2, 3, 300]);
    assert_eq!(table.get(AccuracyMetric::TestAcc).unwrap().shape(), &[2, 3]);
    assert_eq!(table.get(AccuracyMetric::TestAcc).unwrap().get(&[1, 2]), Some(12.0));
    assert_eq!(table.paths(), &["p0".to_string(), "p1".to_string()]);
}

#[test]
fn test_context_unaware_short_train_curve_names_path_and_run() {
    let ws = Workspace::new("short_train");
    for run in 0..3 {
        let train_len = if run == 1 { 299 } else { 300 };
        let location = RecordLocation::new(
            "cu_path",
            Regime::ContextUnaware,
            run,
            Artifact::LossAndMetrics,
        );
        ws.write(&location, &accuracy_record(train_len, 30, 0.0));
    }
    let params = ScanParams::builder()
        .n_runs(3)
        .context_unaware(true)
        .build()
        .unwrap();

    let err = load_accuracies(&ws.store(), &["cu_path"], &params).unwrap_err();
    match &err {
        Error::ShapeMismatch {
            path,
            run,
            metric,
            observed,
            expected,
        } => {
            assert_eq!(path, "cu_path");
            assert_eq!(*run, 1);
            assert_eq!(metric, "cu_train_acc");
            assert_eq!(*observed, 299);
            assert_eq!(*expected, 300);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("Check the number of epochs"));
}

#[test]
fn test_context_unaware_populates_cu_metrics_only() {
    let ws = Workspace::new("cu_only");
    for run in 0..2 {
        let location =
            RecordLocation::new("p", Regime::ContextUnaware, run, Artifact::LossAndMetrics);
        ws.write(&location, &accuracy_record(20, 4, 0.0));
    }
    let params = ScanParams::builder()
        .n_runs(2)
        .n_epochs(20)
        .val_steps(5)
        .context_unaware(true)
        .build()
        .unwrap();

    let table = load_accuracies(&ws.store(), &["p"], &params).unwrap();

    assert_eq!(table.len(), 10);
    for (metric, array) in table.iter() {
        if metric.name().starts_with("cu_") {
            assert!(!array.is_empty(), "{} should be populated", metric.name());
        } else {
            assert_eq!(array.shape(), &[0], "{} should be empty", metric.name());
        }
    }
    assert_eq!(
        table.get_by_name("cu_val_message_lengths").unwrap().shape(),
        &[1, 2, 4]
    );
}

#[test]
fn test_missing_run_is_storage_error() {
    let ws = Workspace::new("missing_run");
    let location = RecordLocation::new("p", Regime::ContextAware, 0, Artifact::LossAndMetrics);
    ws.write(&location, &accuracy_record(300, 30, 0.0));
    let params = ScanParams::builder().n_runs(2).build().unwrap();

    match load_accuracies(&ws.store(), &["p"], &params).unwrap_err() {
        Error::StorageError { location, .. } => {
            assert!(location.ends_with("p/context_aware/1/loss_and_metrics.json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_nonexistent_path_is_storage_error() {
    let ws = Workspace::new("nonexistent");
    let params = ScanParams::default();
    assert!(matches!(
        load_accuracies(&ws.store(), &["does_not_exist"], &params),
        Err(Error::StorageError { .. })
    ));
}

#[test]
fn test_corrupt_record_is_storage_error() {
    let ws = Workspace::new("corrupt");
    let location = RecordLocation::new("p", Regime::ContextAware, 0, Artifact::LossAndMetrics);
    ws.write_raw(&location, b"not json");
    let params = ScanParams::builder().n_runs(1).build().unwrap();

    let err = load_accuracies(&ws.store(), &["p"], &params).unwrap_err();
    assert!(matches!(err, Error::StorageError { .. }));
}

#[test]
fn test_schema_mismatch_is_missing_key() {
    let ws = Workspace::new("schema");
    let location = RecordLocation::new("p", Regime::ContextAware, 0, Artifact::LossAndMetrics);
    let mut record = accuracy_record(300, 30, 0.0);
    record.as_object_mut().unwrap().remove("final_test_acc");
    ws.write(&location, &record);
    let params = ScanParams::builder().n_runs(1).build().unwrap();

    match load_accuracies(&ws.store(), &["p"], &params).unwrap_err() {
        Error::MissingKey { key, location } => {
            assert_eq!(key, "final_test_acc");
            assert!(location.contains("p/context_aware/0"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// =============================================================================
// Entropy pipeline
// =============================================================================

#[test]
fn test_entropy_table_has_nine_scalar_metrics() {
    let ws = Workspace::new("entropy");
    let paths = ["p0", "p1"];
    for (p, path) in paths.iter().enumerate() {
        for run in 0..2 {
            let location =
                RecordLocation::new(*path, Regime::ContextAware, run, Artifact::EntropyScores);
            ws.write(&location, &entropy_record(seed_for(p, run)));
        }
    }
    let params = ScanParams::builder().n_runs(2).build().unwrap();

    let table = load_entropies(&ws.store(), &paths, &params).unwrap();

    assert_eq!(table.len(), 9);
    for (_, array) in table.iter() {
        assert_eq!(array.shape(), &[2, 2]);
    }
    let nmi = table.get(EntropyMetric::Nmi).unwrap();
    assert_eq!(nmi.get(&[1, 1]), Some(11.0));
    let consistency_cxc = table.get_by_name("consistency_concept_x_context").unwrap();
    assert_eq!(consistency_cxc.get(&[0, 1]), Some(1.0 + 2.0 + 0.2));
}

#[test]
fn test_entropy_scores_with_bare_nan_tokens() {
    let ws = Workspace::new("entropy_nan");
    let location = RecordLocation::new("p", Regime::ContextAware, 0, Artifact::EntropyScores);
    // As written by Python's json.dump for undefined scores
    ws.write_raw(
        &location,
        br#"{"normalized_mutual_info": NaN, "normalized_mutual_info_context_dep": 0.1,
            "normalized_mutual_info_concept_x_context": Infinity,
            "effectiveness": 0.2, "effectiveness_context_dep": 0.3,
            "effectiveness_concept_x_context": -Infinity,
            "consistency": 0.4, "consistency_context_dep": 0.5,
            "consistency_concept_x_context": 0.6}"#,
    );
    let params = ScanParams::builder().n_runs(1).build().unwrap();

    let table = load_entropies(&ws.store(), &["p"], &params).unwrap();

    assert!(table.get(EntropyMetric::Nmi).unwrap().get(&[0, 0]).unwrap().is_nan());
    assert_eq!(
        table.get(EntropyMetric::NmiConceptXContext).unwrap().get(&[0, 0]),
        Some(f64::INFINITY)
    );
    assert_eq!(
        table.get(EntropyMetric::EffectivenessConceptXContext).unwrap().get(&[0, 0]),
        Some(f64::NEG_INFINITY)
    );
    assert_eq!(table.get(EntropyMetric::Consistency).unwrap().get(&[0, 0]), Some(0.4));
}

#[test]
fn test_entropy_reads_only_selected_regime() {
    let ws = Workspace::new("entropy_regime");
    let location = RecordLocation::new("p", Regime::ContextAware, 0, Artifact::EntropyScores);
    ws.write(&location, &entropy_record(0.0));
    let params = ScanParams::builder()
        .n_runs(1)
        .context_unaware(true)
        .build()
        .unwrap();

    match load_entropies(&ws.store(), &["p"], &params).unwrap_err() {
        Error::StorageError { location, .. } => assert!(location.contains("context_unaware")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_export_long_format_from_disk() {
    let ws = Workspace::new("export");
    let location = RecordLocation::new("p", Regime::ContextAware, 0, Artifact::LossAndMetrics);
    ws.write(&location, &accuracy_record(4, 2, 0.0));
    let params = ScanParams::builder()
        .n_runs(1)
        .n_epochs(4)
        .val_steps(2)
        .build()
        .unwrap();

    let table = load_accuracies(&ws.store(), &["p"], &params).unwrap();
    let batch = table.to_record_batch().unwrap();

    // train 4 + val 2 + test 1 + train lengths 4 + val lengths 2
    assert_eq!(batch.num_rows(), 13);
    assert_eq!(batch.num_columns(), 5);
}
