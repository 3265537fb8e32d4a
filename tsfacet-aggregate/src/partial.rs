//! Finalized output of one segment scan.

use crate::entry::{Entry, EntryMap, FacetKey};
use crate::pool::PooledMap;

/// Default page size of a latest facet.
pub const DEFAULT_SIZE: u32 = 10;
/// Default page offset of a latest facet.
pub const DEFAULT_START: u32 = 0;

/// Request metadata carried unchanged from the request through merge to
/// pagination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacetHeader {
    pub name: String,
    pub requested_size: u32,
    pub requested_start: u32,
}

impl FacetHeader {
    pub fn new(name: impl Into<String>, requested_size: u32, requested_start: u32) -> Self {
        Self {
            name: name.into(),
            requested_size,
            requested_start,
        }
    }
}

/// One segment's key → latest entry map plus its request metadata.
///
/// Immutable once built. The map is owned, not copied: it is the same buffer
/// the aggregator filled, and it goes back to its pool when the partial is
/// consumed.
#[derive(Debug)]
pub struct PartialResult {
    header: FacetHeader,
    total_distinct_keys: u64,
    entries: PooledMap,
}

impl PartialResult {
    pub(crate) fn new(header: FacetHeader, entries: PooledMap) -> Self {
        Self {
            header,
            total_distinct_keys: entries.len() as u64,
            entries,
        }
    }

    pub fn header(&self) -> &FacetHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn requested_size(&self) -> u32 {
        self.header.requested_size
    }

    pub fn requested_start(&self) -> u32 {
        self.header.requested_start
    }

    /// Distinct keys in this partial at the time it was built.
    pub fn total_distinct_keys(&self) -> u64 {
        self.total_distinct_keys
    }

    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    pub fn get(&self, key: FacetKey) -> Option<Entry> {
        self.entries.get(&key).copied()
    }

    pub fn into_parts(self) -> (FacetHeader, PooledMap) {
        (self.header, self.entries)
    }

    pub fn into_entries(self) -> PooledMap {
        self.entries
    }
}
