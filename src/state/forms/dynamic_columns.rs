//! Runtime-added table columns
//!
//! A registry belongs to one table of one open form. It only describes the
//! extra columns; the values live in each row's `DynamicFieldMap`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::FormError;

/// Derive a column key from its label: all whitespace is dropped.
///
/// `"Batch Ref"` and `"Batch  Ref"` both become `"BatchRef"`.
pub fn derive_key(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A {key, label} pair describing one runtime-added column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicColumn {
    pub key: String,
    pub label: String,
}

/// Ordered set of dynamic columns for a single table
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<DynamicColumn>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column from an operator-entered label.
    ///
    /// Returns `Ok(None)` when the label is blank (treated as a cancelled
    /// prompt) and `DuplicateColumn` when the derived key is taken. In both
    /// cases the registry is unchanged.
    pub fn add_column(&mut self, label: &str) -> Result<Option<DynamicColumn>, FormError> {
        let label = label.trim();
        if label.is_empty() {
            return Ok(None);
        }

        let key = derive_key(label);
        if self.contains(&key) {
            warn!(key = %key, "rejected duplicate dynamic column");
            return Err(FormError::DuplicateColumn { key });
        }

        let column = DynamicColumn {
            key,
            label: label.to_string(),
        };
        debug!(key = %column.key, label = %column.label, "added dynamic column");
        self.columns.push(column.clone());
        Ok(Some(column))
    }

    /// Remove a column descriptor. Row values stored under `key` are kept.
    pub fn remove_column(&mut self, key: &str) -> Option<DynamicColumn> {
        let position = self.columns.iter().position(|c| c.key == key)?;
        let removed = self.columns.remove(position);
        debug!(key = %removed.key, "removed dynamic column");
        Some(removed)
    }

    /// Columns in insertion order. Call again to restart.
    pub fn columns(&self) -> std::slice::Iter<'_, DynamicColumn> {
        self.columns.iter()
    }

    pub fn get(&self, key: &str) -> Option<&DynamicColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
