use std::fmt;

use arrow::record_batch::RecordBatch;
use tsfacet_result::{Error, Result};

use crate::arrow_values::ArrowDocValues;
use crate::doc_values::DocValues;

/// Identifier of an independently scanned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SegmentId(pub u32);

impl From<u32> for SegmentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<SegmentId> for u32 {
    fn from(id: SegmentId) -> Self {
        id.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg-{}", self.0)
    }
}

/// An independently scannable partition of the document collection.
///
/// Documents are identified by `0..num_docs()` and visited in that order.
pub trait Segment: Send + Sync {
    /// Value source handed out per field.
    type Values: DocValues;

    fn id(&self) -> SegmentId;

    fn num_docs(&self) -> usize;

    /// Resolve the value source for `field`.
    ///
    /// Fails with [`Error::ColumnNotFound`] when the segment has no such field.
    fn column(&self, field: &str) -> Result<Self::Values>;
}

/// A segment backed by one Arrow [`RecordBatch`]; row `i` is document `i`.
#[derive(Clone, Debug)]
pub struct RecordBatchSegment {
    id: SegmentId,
    batch: RecordBatch,
}

impl RecordBatchSegment {
    pub fn new(id: impl Into<SegmentId>, batch: RecordBatch) -> Self {
        Self {
            id: id.into(),
            batch,
        }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

impl Segment for RecordBatchSegment {
    type Values = ArrowDocValues;

    fn id(&self) -> SegmentId {
        self.id
    }

    fn num_docs(&self) -> usize {
        self.batch.num_rows()
    }

    fn column(&self, field: &str) -> Result<ArrowDocValues> {
        let array = self
            .batch
            .column_by_name(field)
            .ok_or_else(|| Error::ColumnNotFound(field.to_string()))?;
        ArrowDocValues::try_new(array.clone())
    }
}
