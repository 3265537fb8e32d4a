//! Per-segment collection.

use tsfacet_column::{DocId, DocValues};
use tsfacet_result::{Error, Result};

use crate::entry::{Entry, fold_entry};
use crate::partial::{FacetHeader, PartialResult};
use crate::pool::PooledMap;

/// Folds one segment's documents into a key → latest entry map.
///
/// One aggregator serves one segment scan on one thread. The map is handed
/// to the [`PartialResult`] on [`SegmentAggregator::build`]; any later call
/// fails with [`Error::AggregatorFinished`].
#[derive(Debug)]
pub struct SegmentAggregator {
    entries: Option<PooledMap>,
    docs_seen: u64,
}

impl SegmentAggregator {
    /// Start collecting into `entries`, which is cleared first.
    pub fn new(mut entries: PooledMap) -> Self {
        entries.clear();
        Self {
            entries: Some(entries),
            docs_seen: 0,
        }
    }

    /// Fold one document.
    ///
    /// Every key the document holds is considered. A document without a
    /// timestamp or without a value contributes nothing; when several
    /// timestamps or values are present the first reported one is used.
    /// Values are narrowed to `i32` by truncation.
    pub fn on_document<K, V, T>(
        &mut self,
        doc: DocId,
        keys: &K,
        values: &V,
        timestamps: &T,
    ) -> Result<()>
    where
        K: DocValues,
        V: DocValues,
        T: DocValues,
    {
        let entries = self.entries.as_mut().ok_or(Error::AggregatorFinished)?;
        self.docs_seen += 1;

        let Some(ts) = timestamps.first_value(doc) else {
            return Ok(());
        };
        // Read at most once, and only when some key needs it.
        let mut value: Option<Option<i32>> = None;
        keys.for_each_value(doc, |key| {
            if entries.get(&key).is_some_and(|e| !e.is_superseded_by(ts)) {
                return;
            }
            let value = *value.get_or_insert_with(|| values.first_value(doc).map(|v| v as i32));
            if let Some(value) = value {
                fold_entry(entries, key, Entry::new(ts, value));
            }
        });
        Ok(())
    }

    /// Distinct keys collected so far; zero once built.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_finished(&self) -> bool {
        self.entries.is_none()
    }

    /// Documents passed to [`SegmentAggregator::on_document`].
    pub fn docs_seen(&self) -> u64 {
        self.docs_seen
    }

    /// Hand the map off as a [`PartialResult`].
    pub fn build(&mut self, header: FacetHeader) -> Result<PartialResult> {
        let entries = self.entries.take().ok_or(Error::AggregatorFinished)?;
        tracing::debug!(
            facet = %header.name,
            docs = self.docs_seen,
            keys = entries.len(),
            "built partial latest facet"
        );
        Ok(PartialResult::new(header, entries))
    }
}
