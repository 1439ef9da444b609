//! In-memory record store using `DashMap`.
//!
//! Data is lost on process restart. Used for tests, demos, and callers that
//! already hold decoded records.

use super::{Record, RecordLocation, RecordStore};
use crate::{Error, Result};
use dashmap::DashMap;
use serde_json::{Map, Value};

/// In-memory record store using a lock-free concurrent hashmap.
///
/// # Example
///
/// ```rust
/// use experiment_results::record::{Artifact, MemoryRecordStore, RecordLocation, RecordStore, Regime};
/// use serde_json::json;
///
/// let store = MemoryRecordStore::new();
/// let location = RecordLocation::new("exp", Regime::ContextAware, 0, Artifact::EntropyScores);
/// store.insert_value(location.clone(), json!({"effectiveness": 0.4}))?;
///
/// let record = store.load(&location)?;
/// assert!(record.contains_key("effectiveness"));
/// # Ok::<(), experiment_results::Error>(())
/// ```
pub struct MemoryRecordStore {
    records: DashMap<RecordLocation, Map<String, Value>>,
}

impl MemoryRecordStore {
    /// Create a new in-memory record store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
        }
    }

    /// Store decoded fields at `location`, replacing any previous record.
    pub fn insert(&self, location: RecordLocation, fields: Map<String, Value>) {
        self.records.insert(location, fields);
    }

    /// Store a JSON value at `location`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `value` is not a JSON object.
    pub fn insert_value(&self, location: RecordLocation, value: Value) -> Result<()> {
        match value {
            Value::Object(fields) => {
                self.insert(location, fields);
                Ok(())
            }
            _ => Err(Error::InvalidInput(format!(
                "record for {location} must be a JSON object"
            ))),
        }
    }

    /// Remove the record at `location`.
    pub fn remove(&self, location: &RecordLocation) {
        self.records.remove(location);
    }

    /// Get the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, location: &RecordLocation) -> Result<Record> {
        self.records
            .get(location)
            .map(|fields| Record::new(location.clone(), fields.value().clone()))
            .ok_or_else(|| Error::StorageError {
                location: location.to_string(),
                reason: "no record stored at this location".to_string(),
            })
    }
}
