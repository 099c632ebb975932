//! Exact-match index over the first column of a range

use ahash::AHashMap;
use cellflow_core::{CellValue, SharedString};

/// Hashable form of a lookup key
///
/// Equality is typed: a number only matches a number, text only text (case
/// sensitive), a boolean only a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Number(u64),
    Text(SharedString),
    Boolean(bool),
}

impl IndexKey {
    /// Empty cells and errors are never indexed
    fn from_value(value: &CellValue) -> Option<Self> {
        match value {
            // -0.0 and 0.0 compare equal, so they must hash the same
            CellValue::Number(n) if *n == 0.0 => Some(IndexKey::Number(0f64.to_bits())),
            CellValue::Number(n) => Some(IndexKey::Number(n.to_bits())),
            CellValue::Text(s) => Some(IndexKey::Text(s.clone())),
            CellValue::Boolean(b) => Some(IndexKey::Boolean(*b)),
            CellValue::Empty | CellValue::Error(_) => None,
        }
    }
}

/// Maps each distinct value of a column to the first row holding it
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    rows: AHashMap<IndexKey, usize>,
}

impl ColumnIndex {
    /// Index a column given top to bottom
    pub fn build<'a>(column: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut rows = AHashMap::new();
        for (row, value) in column.into_iter().enumerate() {
            if let Some(key) = IndexKey::from_value(value) {
                rows.entry(key).or_insert(row);
            }
        }
        Self { rows }
    }

    /// Row offset of the topmost cell equal to `key`
    pub fn find(&self, key: &CellValue) -> Option<usize> {
        IndexKey::from_value(key).and_then(|key| self.rows.get(&key).copied())
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
