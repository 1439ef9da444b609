//! Per-run records
//!
//! A [`Record`] is the opaque key/value document one training run leaves
//! behind. It is produced elsewhere, read exactly once per aggregation
//! call, and never mutated.
//!
//! ## Schema Overview
//!
//! ```text
//! {path}/{regime}/{run}/loss_and_metrics.json   -> AccuracyRecord
//! {path}/{regime}/{run}/entropy_scores.json     -> EntropyRecord
//! ```
//!
//! Raw string-keyed lookups stay inside this module. Aggregation code only
//! sees the typed views in [`schema`], which are validated when built.
//!
//! ## Usage
//!
//! ```rust
//! use experiment_results::record::{Artifact, Record, RecordLocation, Regime};
//!
//! let location = RecordLocation::new("exp", Regime::ContextAware, 0, Artifact::LossAndMetrics);
//! let record = Record::from_json_slice(
//!     location,
//!     br#"{"metrics_test0": {"10": 0.9, "2": 0.5}, "final_test_acc": 0.88}"#,
//! )?;
//!
//! let val = record.series("metrics_test0")?;
//! assert_eq!(val.sorted_values(), vec![0.5, 0.9]);
//! assert!((record.scalar("final_test_acc")? - 0.88).abs() < f64::EPSILON);
//! # Ok::<(), experiment_results::Error>(())
//! ```

mod location;
mod memory;
pub mod schema;
mod store;

pub use location::{Artifact, RecordLocation, Regime, RECORD_EXTENSION};
pub use memory::MemoryRecordStore;
pub use schema::{AccuracyRecord, EntropyRecord};
pub use store::{FsRecordStore, RecordStore};

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Bare non-finite float tokens written by Python's `json` module.
/// `-Infinity` must be matched before `Infinity`.
const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Epoch-indexed sub-mapping of a record (epoch index -> scalar).
///
/// Points keep the record store's native order; [`EpochSeries::sorted_values`]
/// is the only way to turn them into a time series.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSeries {
    key: String,
    points: Vec<(u64, f64)>,
}

impl EpochSeries {
    /// Create a series from `(epoch, value)` points in any order.
    #[must_use]
    pub fn new(key: impl Into<String>, points: impl IntoIterator<Item = (u64, f64)>) -> Self {
        Self {
            key: key.into(),
            points: points.into_iter().collect(),
        }
    }

    /// Get the record key this series was read from.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of epoch entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values ordered by ascending epoch index, indices discarded.
    #[must_use]
    pub fn sorted_values(&self) -> Vec<f64> {
        let mut points = self.points.clone();
        points.sort_by_key(|&(epoch, _)| epoch);
        points.into_iter().map(|(_, value)| value).collect()
    }
}

/// Opaque per-run record: a mapping from string keys to JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    location: RecordLocation,
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record from already decoded fields.
    #[must_use]
    pub const fn new(location: RecordLocation, fields: Map<String, Value>) -> Self {
        Self { location, fields }
    }

    /// Decode a record from its JSON representation.
    ///
    /// Bare `NaN`, `Infinity` and `-Infinity` tokens outside strings are
    /// accepted and read back as non-finite numbers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bytes are not JSON or the top level is
    /// not an object.
    pub fn from_json_slice(location: RecordLocation, bytes: &[u8]) -> Result<Self> {
        let bytes = quote_non_finite(bytes);
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| Error::StorageError {
            location: location.to_string(),
            reason: format!("Failed to decode record: {e}"),
        })?;

        match value {
            Value::Object(fields) => Ok(Self::new(location, fields)),
            other => Err(Error::StorageError {
                location: location.to_string(),
                reason: format!("Expected a JSON object at top level, found {}", kind(&other)),
            }),
        }
    }

    /// Get the location this record was loaded from.
    #[must_use]
    pub const fn location(&self) -> &RecordLocation {
        &self.location
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if a top-level key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Read a scalar field.
    ///
    /// `null` reads as NaN, as do the strings `"NaN"`, `"Infinity"` and
    /// `"-Infinity"` for their respective values.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `InvalidField` if the value is not a number.
    pub fn scalar(&self, key: &str) -> Result<f64> {
        let value = self.field(key)?;
        number(value)
            .ok_or_else(|| self.invalid(key, format!("expected a number, found {}", kind(value))))
    }

    /// Read an epoch-indexed sub-mapping.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `InvalidField` if the value is not an object,
    /// an epoch key is not a non-negative integer, or a value is not a number.
    pub fn series(&self, key: &str) -> Result<EpochSeries> {
        let value = self.field(key)?;
        let Value::Object(entries) = value else {
            return Err(self.invalid(
                key,
                format!("expected an epoch-indexed object, found {}", kind(value)),
            ));
        };

        let points = entries
            .iter()
            .map(|(epoch, value)| -> Result<(u64, f64)> {
                let epoch_index = epoch.trim().parse::<u64>().map_err(|_| {
                    self.invalid(key, format!("epoch index '{epoch}' is not a non-negative integer"))
                })?;
                let scalar = number(value).ok_or_else(|| {
                    self.invalid(
                        key,
                        format!("value at epoch {epoch} is {}, expected a number", kind(value)),
                    )
                })?;
                Ok((epoch_index, scalar))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EpochSeries::new(key, points))
    }

    fn field(&self, key: &str) -> Result<&Value> {
        self.fields.get(key).ok_or_else(|| Error::MissingKey {
            location: self.location.to_string(),
            key: key.to_string(),
        })
    }

    fn invalid(&self, key: &str, reason: String) -> Error {
        Error::InvalidField {
            location: self.location.to_string(),
            key: key.to_string(),
            reason,
        }
    }
}

/// Numeric reading of a JSON value, including the non-finite encodings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(f64::NAN),
        Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Rewrite bare non-finite tokens outside JSON strings as quoted strings.
///
/// Borrows the input untouched when no such token occurs.
fn quote_non_finite(bytes: &[u8]) -> Cow<'_, [u8]> {
    let mut quoted: Option<Vec<u8>> = None;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
        } else if byte == b'"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE_TOKENS
            .iter()
            .find(|token| bytes[i..].starts_with(token.as_bytes()))
        {
            let out = quoted.get_or_insert_with(|| bytes[..i].to_vec());
            out.push(b'"');
            out.extend_from_slice(token.as_bytes());
            out.push(b'"');
            i += token.len();
            continue;
        }

        if let Some(out) = quoted.as_mut() {
            out.push(byte);
        }
        i += 1;
    }

    quoted.map_or(Cow::Borrowed(bytes), Cow::Owned)
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
