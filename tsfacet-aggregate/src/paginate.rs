//! Final page of a latest facet.

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use serde::Serialize;
use tsfacet_result::{Error, Result};

use crate::entry::{EntryMap, FacetKey, LatestEntry};

/// Order in which keys are laid out before the page window is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum KeyOrder {
    #[default]
    Ascending,
    Descending,
}

impl KeyOrder {
    #[inline]
    fn compare(self, a: &FacetKey, b: &FacetKey) -> Ordering {
        match self {
            KeyOrder::Ascending => a.cmp(b),
            KeyOrder::Descending => b.cmp(a),
        }
    }
}

/// Cuts an `[start, start + size)` window out of a merged map.
#[derive(Clone, Copy, Debug, Default)]
pub struct Paginator {
    order: KeyOrder,
}

impl Paginator {
    pub fn new(order: KeyOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> KeyOrder {
        self.order
    }

    /// Entries at positions `[start, start + size)` of the key order.
    ///
    /// A window starting past the end is empty and a window running past the
    /// end is cut short. Negative `start` or `size` is a caller error.
    pub fn paginate(&self, entries: &EntryMap, start: i64, size: i64) -> Result<Vec<LatestEntry>> {
        if start < 0 {
            return Err(Error::InvalidArgumentError(format!(
                "pagination start must be >= 0, got {start}"
            )));
        }
        if size < 0 {
            return Err(Error::InvalidArgumentError(format!(
                "pagination size must be >= 0, got {size}"
            )));
        }

        let total = entries.len();
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        if start >= total || size == 0 {
            return Ok(Vec::new());
        }
        let end = start
            .saturating_add(usize::try_from(size).unwrap_or(usize::MAX))
            .min(total);

        let mut keys: Vec<FacetKey> = entries.keys().copied().collect();
        // Only the first `end` keys need to be in order.
        if end < total {
            keys.select_nth_unstable_by(end, |a, b| self.order.compare(a, b));
            keys.truncate(end);
        }
        keys.sort_unstable_by(|a, b| self.order.compare(a, b));

        let page: Vec<LatestEntry> = keys[start..end]
            .iter()
            .filter_map(|k| entries.get(k).map(|e| LatestEntry::new(*k, *e)))
            .collect();
        tracing::trace!(start, end, total, "paginated latest facet");
        Ok(page)
    }
}

/// Presentation output: one page of `(key, ts, value)` rows plus the global
/// distinct-key count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LatestFacet {
    pub name: String,
    pub requested_size: u32,
    pub requested_start: u32,
    pub total_distinct_keys: u64,
    pub entries: Vec<LatestEntry>,
}

impl LatestFacet {
    pub fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("key", DataType::Int64, false),
            Field::new("ts", DataType::Int64, false),
            Field::new("value", DataType::Int32, false),
        ]))
    }

    /// The page as an Arrow batch with columns `key`, `ts`, `value`.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let keys = Int64Array::from_iter_values(self.entries.iter().map(|e| e.key));
        let ts = Int64Array::from_iter_values(self.entries.iter().map(|e| e.ts));
        let values = Int32Array::from_iter_values(self.entries.iter().map(|e| e.value));
        let columns: Vec<ArrayRef> = vec![Arc::new(keys), Arc::new(ts), Arc::new(values)];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}
