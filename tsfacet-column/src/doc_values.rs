/// Position of a document inside its segment.
///
/// Segments visit documents in ascending `DocId` order.
pub type DocId = usize;

/// Read access to the integer values a field holds for each document.
///
/// A document may hold zero, one or many values for a field. Implementations
/// return zero values for documents past [`DocValues::num_docs`] rather than
/// failing; the aggregation treats an absent reading as "skip".
pub trait DocValues: Send + Sync {
    /// Number of documents this source covers.
    fn num_docs(&self) -> usize;

    /// Number of values `doc` holds.
    fn value_count(&self, doc: DocId) -> usize;

    /// The `idx`-th value of `doc`, or `None` when `idx >= value_count(doc)`.
    fn value_at(&self, doc: DocId, idx: usize) -> Option<i64>;

    /// The first reported value of `doc`.
    #[inline]
    fn first_value(&self, doc: DocId) -> Option<i64> {
        self.value_at(doc, 0)
    }

    /// Invoke `f` once per value of `doc`, in reported order.
    #[inline]
    fn for_each_value<F>(&self, doc: DocId, mut f: F)
    where
        F: FnMut(i64),
        Self: Sized,
    {
        for idx in 0..self.value_count(doc) {
            if let Some(v) = self.value_at(doc, idx) {
                f(v);
            }
        }
    }
}

impl<T: DocValues + ?Sized> DocValues for &T {
    #[inline]
    fn num_docs(&self) -> usize {
        (**self).num_docs()
    }

    #[inline]
    fn value_count(&self, doc: DocId) -> usize {
        (**self).value_count(doc)
    }

    #[inline]
    fn value_at(&self, doc: DocId, idx: usize) -> Option<i64> {
        (**self).value_at(doc, idx)
    }
}
