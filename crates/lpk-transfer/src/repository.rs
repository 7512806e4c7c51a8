//! Persistence seam.
//!
//! Reconciliation only needs two calls from storage: look a record up by a
//! unique field, and create one. [`MemoryRepository`] keeps collections in
//! memory; [`JsonFileRepository`] persists them to a JSON file after every
//! create.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::clean::clean_text;
use crate::entities::{EntityKind, EntityRecord};
use crate::path::FieldPath;

/// A storage call failed. The message is shown to the operator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Storage used by [`import_records`](crate::reconcile::import_records)
pub trait Repository {
    /// First stored record of `kind` whose `field` equals `value`
    fn find_by_unique_field(
        &self,
        kind: EntityKind,
        field: &FieldPath,
        value: &str,
    ) -> Result<Option<Value>, PersistenceError>;

    /// Store a record and return its new id
    fn create(&mut self, record: &EntityRecord) -> Result<String, PersistenceError>;
}

/// Stored records grouped by collection name
pub type Collections = BTreeMap<String, Vec<Value>>;

/// Collections held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    collections: Collections,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collections(collections: Collections) -> Self {
        Self { collections }
    }

    /// Insert a record as-is, without uniqueness checks
    pub fn seed(&mut self, kind: EntityKind, record: Value) {
        self.collections
            .entry(kind.schema().collection.to_string())
            .or_default()
            .push(record);
    }

    /// Stored records of `kind`, in insertion order
    pub fn records(&self, kind: EntityKind) -> &[Value] {
        self.collections
            .get(kind.schema().collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the most recent record of `kind`
    fn pop(&mut self, kind: EntityKind) {
        if let Some(list) = self.collections.get_mut(kind.schema().collection) {
            list.pop();
        }
    }
}

/// Trimmed, case-insensitive comparison of a stored value with a key.
/// Stored numbers are rendered the way imported cells are cleaned, so
/// `3201.0` matches the key `3201`.
fn same_key(stored: &Value, wanted: &str) -> bool {
    if !(stored.is_string() || stored.is_number()) {
        return false;
    }
    match clean_text(Some(stored)) {
        Ok(Some(text)) => text.to_lowercase() == wanted.trim().to_lowercase(),
        _ => false,
    }
}

impl Repository for MemoryRepository {
    fn find_by_unique_field(
        &self,
        kind: EntityKind,
        field: &FieldPath,
        value: &str,
    ) -> Result<Option<Value>, PersistenceError> {
        Ok(self
            .records(kind)
            .iter()
            .find(|record| field.get(record).is_some_and(|v| same_key(v, value)))
            .cloned())
    }

    fn create(&mut self, record: &EntityRecord) -> Result<String, PersistenceError> {
        let kind = record.kind();
        let mut value = record
            .to_value()
            .map_err(|e| PersistenceError::new(e.to_string()))?;
        let id = format!("{}-{}", kind.as_str(), self.records(kind).len() + 1);
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        self.seed(kind, value);
        Ok(id)
    }
}

/// Collections persisted as one JSON object keyed by collection name
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl JsonFileRepository {
    /// Open a store, starting empty when the file does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                MemoryRepository::new()
            } else {
                MemoryRepository::from_collections(serde_json::from_str(&text)?)
            }
        } else {
            MemoryRepository::new()
        };
        tracing::debug!(path = %path.display(), records = inner.len(), "store opened");
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self, kind: EntityKind) -> &[Value] {
        self.inner.records(kind)
    }

    fn save(&self) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(self.inner.collections())
            .map_err(|e| PersistenceError::new(e.to_string()))?;
        std::fs::write(&self.path, text).map_err(|e| {
            PersistenceError::new(format!("cannot write {}: {}", self.path.display(), e))
        })
    }
}

impl Repository for JsonFileRepository {
    fn find_by_unique_field(
        &self,
        kind: EntityKind,
        field: &FieldPath,
        value: &str,
    ) -> Result<Option<Value>, PersistenceError> {
        self.inner.find_by_unique_field(kind, field, value)
    }

    fn create(&mut self, record: &EntityRecord) -> Result<String, PersistenceError> {
        let id = self.inner.create(record)?;
        if let Err(e) = self.save() {
            self.inner.pop(record.kind());
            return Err(e);
        }
        Ok(id)
    }
}
