//! Literal per-document values, used by tests and examples.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tsfacet_result::{Error, Result};

use crate::doc_values::{DocId, DocValues};
use crate::segment::{Segment, SegmentId};

/// Document values spelled out one document at a time.
///
/// Cloning is cheap; the per-document vectors are shared.
#[derive(Clone, Debug, Default)]
pub struct FixtureDocValues {
    docs: Arc<[Vec<i64>]>,
}

impl FixtureDocValues {
    pub fn new(docs: Vec<Vec<i64>>) -> Self {
        Self { docs: docs.into() }
    }

    /// One optional value per document.
    pub fn single<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        Self::new(values.into_iter().map(|v| v.into_iter().collect()).collect())
    }
}

impl DocValues for FixtureDocValues {
    fn num_docs(&self) -> usize {
        self.docs.len()
    }

    #[inline]
    fn value_count(&self, doc: DocId) -> usize {
        self.docs.get(doc).map_or(0, Vec::len)
    }

    #[inline]
    fn value_at(&self, doc: DocId, idx: usize) -> Option<i64> {
        self.docs.get(doc)?.get(idx).copied()
    }
}

/// A segment whose columns are [`FixtureDocValues`].
#[derive(Clone, Debug)]
pub struct FixtureSegment {
    id: SegmentId,
    num_docs: usize,
    columns: FxHashMap<String, FixtureDocValues>,
}

impl FixtureSegment {
    pub fn new(id: impl Into<SegmentId>) -> Self {
        Self {
            id: id.into(),
            num_docs: 0,
            columns: FxHashMap::default(),
        }
    }

    /// Add a column. The segment covers as many documents as its longest column.
    pub fn with_column(mut self, name: impl Into<String>, values: FixtureDocValues) -> Self {
        self.num_docs = self.num_docs.max(values.num_docs());
        self.columns.insert(name.into(), values);
        self
    }

    /// Build a single-valued segment from `(key, ts, value)` triples, one per document.
    pub fn from_triples(
        id: impl Into<SegmentId>,
        fields: (&str, &str, &str),
        docs: &[(Option<i64>, Option<i64>, Option<i64>)],
    ) -> Self {
        let (key, ts, value) = fields;
        Self::new(id)
            .with_column(key, FixtureDocValues::single(docs.iter().map(|d| d.0)))
            .with_column(ts, FixtureDocValues::single(docs.iter().map(|d| d.1)))
            .with_column(value, FixtureDocValues::single(docs.iter().map(|d| d.2)))
    }
}

impl Segment for FixtureSegment {
    type Values = FixtureDocValues;

    fn id(&self) -> SegmentId {
        self.id
    }

    fn num_docs(&self) -> usize {
        self.num_docs
    }

    fn column(&self, field: &str) -> Result<FixtureDocValues> {
        self.columns
            .get(field)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(field.to_string()))
    }
}
