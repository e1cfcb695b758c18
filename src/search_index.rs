//! Equality index over a single column.
//!
//! The index maps every non-null cell value to the ascending list of rows holding it.
//! Null cells are never indexed: a null search key is rejected before the index is
//! consulted.

use std::collections::BTreeMap;
use std::sync::Arc;

use allocative::Allocative;

use crate::value::{Timestamp, Value};

/// A value that can appear as a search-index key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Allocative)]
pub enum IndexKey {
    Bool(bool),
    Int(i64),
    Text(Arc<str>),
    Date(Timestamp),
}

impl IndexKey {
    /// Returns the key for `value`, or `None` for null and for types that cannot be
    /// indexed.
    pub fn from_value(value: &Value) -> Option<IndexKey> {
        match value {
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Int(i) => Some(IndexKey::Int(*i)),
            Value::Text(s) => Some(IndexKey::Text(Arc::clone(s))),
            Value::Date(d) => Some(IndexKey::Date(*d)),
            Value::Null
            | Value::Float(_)
            | Value::Double(_)
            | Value::Binary(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Allocative)]
pub struct SearchIndex {
    entries: BTreeMap<IndexKey, Vec<usize>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from `(row, key)` pairs. Rows must be yielded in ascending order.
    pub fn build(cells: impl IntoIterator<Item = (usize, Option<IndexKey>)>) -> Self {
        let mut index = Self::new();
        for (row, key) in cells {
            if let Some(key) = key {
                index.entries.entry(key).or_default().push(row);
            }
        }
        index
    }

    /// Rows holding `key`, ascending.
    pub fn rows(&self, key: &IndexKey) -> &[usize] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records that `row` now holds `key`.
    pub fn insert(&mut self, key: IndexKey, row: usize) {
        let rows = self.entries.entry(key).or_default();
        // appends are the common case
        if rows.last().is_none_or(|&last| last < row) {
            rows.push(row);
            return;
        }
        let pos = rows.partition_point(|&r| r < row);
        if rows.get(pos) != Some(&row) {
            rows.insert(pos, row);
        }
    }

    /// Records that `row` no longer holds `key`. Other rows keep their numbers.
    pub fn remove(&mut self, key: &IndexKey, row: usize) {
        let Some(rows) = self.entries.get_mut(key) else {
            return;
        };
        if let Ok(pos) = rows.binary_search(&row) {
            rows.remove(pos);
        }
        if rows.is_empty() {
            self.entries.remove(key);
        }
    }

    /// Drops `row` from the index and renumbers every row above it down by one.
    pub fn remove_row(&mut self, key: Option<&IndexKey>, row: usize) {
        if let Some(key) = key {
            self.remove(key, row);
        }
        for rows in self.entries.values_mut() {
            let start = rows.partition_point(|&r| r <= row);
            for r in &mut rows[start..] {
                *r -= 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
