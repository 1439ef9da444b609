//! Columnar export of result tables (Arrow)
//!
//! Flattens a [`ResultTable`] into one long-format `RecordBatch` so the
//! reconciled arrays can be handed to Arrow-based analysis tooling without
//! another pass over the record store.
//!
//! | column | type | notes |
//! |--------|------|-------|
//! | `metric` | Utf8 | table name of the metric |
//! | `path` | Utf8 | path identifier |
//! | `run` | UInt64 | run index |
//! | `epoch` | UInt64 | position along the epoch axis, null for scalars |
//! | `value` | Float64 | |

use crate::aggregate::{MetricName, ResultTable};
use crate::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Schema of the long-format export.
#[must_use]
pub fn long_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("metric", DataType::Utf8, false),
        Field::new("path", DataType::Utf8, false),
        Field::new("run", DataType::UInt64, false),
        Field::new("epoch", DataType::UInt64, true),
        Field::new("value", DataType::Float64, false),
    ]))
}

impl<M: MetricName> ResultTable<M> {
    /// Flatten every populated metric into a long-format `RecordBatch`.
    ///
    /// Unpopulated metrics (shape `(0,)`) contribute no rows.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if an array has more rows than the table has
    /// paths, or an Arrow error if the batch cannot be assembled.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut metrics: Vec<&str> = Vec::new();
        let mut paths: Vec<&str> = Vec::new();
        let mut runs: Vec<u64> = Vec::new();
        let mut epochs: Vec<Option<u64>> = Vec::new();
        let mut values: Vec<f64> = Vec::new();

        for (metric, array) in self.iter() {
            // Unpopulated metrics are 1-axis and hold no lanes
            if array.ndim() < 2 {
                continue;
            }
            let is_curve = array.ndim() == 3;

            for (index, &value) in array.as_array().indexed_iter() {
                let path = self.paths().get(index[0]).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "{}: row {} has no path identifier ({} paths in table)",
                        metric.name(),
                        index[0],
                        self.paths().len()
                    ))
                })?;
                metrics.push(metric.name());
                paths.push(path);
                runs.push(index[1] as u64);
                epochs.push(is_curve.then(|| index[2] as u64));
                values.push(value);
            }
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(metrics)),
            Arc::new(StringArray::from(paths)),
            Arc::new(UInt64Array::from(runs)),
            Arc::new(UInt64Array::from(epochs)),
            Arc::new(Float64Array::from(values)),
        ];

        Ok(RecordBatch::try_new(long_schema(), columns)?)
    }
}
