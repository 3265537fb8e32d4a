use rustc_hash::FxHashMap;
use serde::Serialize;

/// Grouping key of a latest-value facet.
pub type FacetKey = i64;

/// Per-key aggregation map. At most one [`Entry`] per key.
pub type EntryMap = FxHashMap<FacetKey, Entry>;

/// The `(timestamp, value)` pair currently considered latest for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub ts: i64,
    pub value: i32,
}

impl Entry {
    #[inline]
    pub fn new(ts: i64, value: i32) -> Self {
        Self { ts, value }
    }

    /// Whether an observation at `ts` replaces this entry.
    ///
    /// Strictly greater only: on equal timestamps the entry folded in first
    /// stays.
    #[inline]
    pub fn is_superseded_by(&self, ts: i64) -> bool {
        ts > self.ts
    }

    /// Overwrite timestamp and value together.
    #[inline]
    pub fn replace(&mut self, ts: i64, value: i32) {
        self.ts = ts;
        self.value = value;
    }
}

/// One row of a paginated facet: a key with its latest entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LatestEntry {
    pub key: FacetKey,
    pub ts: i64,
    pub value: i32,
}

impl LatestEntry {
    #[inline]
    pub fn new(key: FacetKey, entry: Entry) -> Self {
        Self {
            key,
            ts: entry.ts,
            value: entry.value,
        }
    }
}

/// Fold `(key, entry)` into `map` under last-write-wins-by-timestamp.
///
/// Returns `true` when the map changed.
#[inline]
pub fn fold_entry(map: &mut EntryMap, key: FacetKey, entry: Entry) -> bool {
    use std::collections::hash_map::Entry as Slot;
    match map.entry(key) {
        Slot::Occupied(mut slot) => {
            if slot.get().is_superseded_by(entry.ts) {
                slot.get_mut().replace(entry.ts, entry.value);
                true
            } else {
                false
            }
        }
        Slot::Vacant(slot) => {
            slot.insert(entry);
            true
        }
    }
}
