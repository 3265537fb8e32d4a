//! Reduce step: combine per-segment partial results into one global map.
//!
//! Partials are folded in a fixed, caller-supplied order using the same
//! last-write-wins rule as segment collection. On equal timestamps the entry
//! merged first survives, so the result depends only on that order and never
//! on how fast individual segments finished.

use tsfacet_result::{Error, Result};

use crate::entry::{Entry, EntryMap, FacetKey, fold_entry};
use crate::paginate::{LatestFacet, Paginator};
use crate::partial::{FacetHeader, PartialResult};
use crate::pool::PooledMap;

/// Incremental merger over partial results of one facet request.
#[derive(Debug)]
pub struct ResultMerger {
    header: FacetHeader,
    merged: PooledMap,
    partials: usize,
}

impl ResultMerger {
    /// Start a merge for `header`, accumulating into `merged` (cleared first).
    pub fn new(header: FacetHeader, mut merged: PooledMap) -> Self {
        merged.clear();
        Self {
            header,
            merged,
            partials: 0,
        }
    }

    pub fn header(&self) -> &FacetHeader {
        &self.header
    }

    /// Partials merged so far.
    pub fn partials(&self) -> usize {
        self.partials
    }

    /// Fold the next partial in merge order.
    ///
    /// Fails with [`Error::InvalidArgumentError`] when the partial belongs to a
    /// different facet or carries a different requested window; the merged
    /// map is left untouched in that case.
    pub fn push(&mut self, partial: PartialResult) -> Result<()> {
        ensure_same_request(&self.header, partial.header())?;
        self.partials += 1;

        let incoming = partial.into_entries();
        if self.merged.is_empty() {
            // Nothing to compare against: adopt the partial's map wholesale.
            // The (empty) accumulator goes back to the pool with `incoming`.
            let mut incoming = incoming;
            std::mem::swap(&mut self.merged, &mut incoming);
            return Ok(());
        }
        for (&key, &entry) in incoming.iter() {
            fold_entry(&mut self.merged, key, entry);
        }
        Ok(())
    }

    pub fn finish(self) -> MergedResult {
        tracing::debug!(
            facet = %self.header.name,
            partials = self.partials,
            keys = self.merged.len(),
            "merged latest facet partials"
        );
        MergedResult {
            header: self.header,
            entries: self.merged,
            partials: self.partials,
        }
    }
}

fn ensure_same_request(expected: &FacetHeader, got: &FacetHeader) -> Result<()> {
    if expected == got {
        return Ok(());
    }
    Err(Error::InvalidArgumentError(format!(
        "partial result for facet '{}' (size {}, start {}) does not belong to facet '{}' (size {}, start {})",
        got.name,
        got.requested_size,
        got.requested_start,
        expected.name,
        expected.requested_size,
        expected.requested_start
    )))
}

/// Merge `partials` in iteration order into `merged`.
///
/// Zero partials yield an empty result; a single partial is passed through
/// unchanged.
pub fn merge<I>(header: FacetHeader, merged: PooledMap, partials: I) -> Result<MergedResult>
where
    I: IntoIterator<Item = PartialResult>,
{
    let mut merger = ResultMerger::new(header, merged);
    for partial in partials {
        merger.push(partial)?;
    }
    Ok(merger.finish())
}

/// Merge `partials` by parallel pairwise reduction.
///
/// Produces exactly what [`merge`] produces for the same order: every
/// combine step lets the left (earlier) operand win timestamp ties, and that
/// rule is associative.
pub fn merge_tree(header: FacetHeader, partials: Vec<PartialResult>) -> Result<MergedResult> {
    for partial in &partials {
        ensure_same_request(&header, partial.header())?;
    }
    let count = partials.len();
    let maps: Vec<PooledMap> = partials.into_iter().map(PartialResult::into_entries).collect();
    let entries = reduce(maps).unwrap_or_else(|| PooledMap::detached(EntryMap::default()));

    tracing::debug!(
        facet = %header.name,
        partials = count,
        keys = entries.len(),
        "tree-merged latest facet partials"
    );
    Ok(MergedResult {
        header,
        entries,
        partials: count,
    })
}

fn reduce(mut maps: Vec<PooledMap>) -> Option<PooledMap> {
    match maps.len() {
        0 => None,
        1 => maps.pop(),
        n => {
            let right = maps.split_off(n / 2);
            let (left, right) = rayon::join(|| reduce(maps), || reduce(right));
            match (left, right) {
                (Some(left), Some(right)) => Some(combine(left, right)),
                (left, right) => left.or(right),
            }
        }
    }
}

/// Combine two reduced maps, `left` preceding `right` in merge order.
fn combine(mut left: PooledMap, mut right: PooledMap) -> PooledMap {
    // Walk the smaller map; which side wins a tie does not change.
    if left.len() >= right.len() {
        for (&key, &entry) in right.iter() {
            fold_entry(&mut left, key, entry);
        }
        left
    } else {
        for (&key, &entry) in left.iter() {
            match right.get_mut(&key) {
                Some(existing) if existing.ts > entry.ts => {}
                Some(existing) => *existing = entry,
                None => {
                    right.insert(key, entry);
                }
            }
        }
        right
    }
}

/// The global key → latest entry map of one facet request.
#[derive(Debug)]
pub struct MergedResult {
    header: FacetHeader,
    entries: PooledMap,
    partials: usize,
}

impl MergedResult {
    pub fn header(&self) -> &FacetHeader {
        &self.header
    }

    /// Distinct keys across all merged partials.
    pub fn total_distinct_keys(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    pub fn get(&self, key: FacetKey) -> Option<Entry> {
        self.entries.get(&key).copied()
    }

    pub fn partials(&self) -> usize {
        self.partials
    }

    /// Cut the requested page out of the merged map.
    pub fn paginate(&self, paginator: &Paginator) -> Result<LatestFacet> {
        let entries = paginator.paginate(
            &self.entries,
            i64::from(self.header.requested_start),
            i64::from(self.header.requested_size),
        )?;
        Ok(LatestFacet {
            name: self.header.name.clone(),
            requested_size: self.header.requested_size,
            requested_start: self.header.requested_start,
            total_distinct_keys: self.total_distinct_keys(),
            entries,
        })
    }
}
