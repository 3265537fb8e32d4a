//! Arrow-backed document values.

use std::ops::Range;

use arrow::array::{Array, ArrayRef, AsArray, GenericListArray, Int64Array, OffsetSizeTrait};
use arrow::compute::{CastOptions, cast_with_options};
use arrow::datatypes::{DataType, Int64Type};
use tsfacet_result::{Error, Result};

use crate::doc_values::{DocId, DocValues};

/// Document values read from an Arrow column.
///
/// The representation is fixed when the column is wrapped:
///
/// - any integer, timestamp or `Date64` array becomes a single-valued source
///   (widened to `Int64`; nulls hold no value)
/// - a `List`/`LargeList` of such values becomes a multi-valued source (a null
///   list holds no values, null items inside a list are skipped)
///
/// Every other data type is rejected up front.
#[derive(Clone, Debug)]
pub struct ArrowDocValues {
    repr: Repr,
}

#[derive(Clone, Debug)]
enum Repr {
    Single(Int64Array),
    List(ListValues<i32>),
    LargeList(ListValues<i64>),
}

#[derive(Clone, Debug)]
struct ListValues<O: OffsetSizeTrait> {
    lists: GenericListArray<O>,
    items: Int64Array,
}

impl ArrowDocValues {
    /// Wrap `array`, selecting the representation from its data type.
    pub fn try_new(array: ArrayRef) -> Result<Self> {
        let repr = match array.data_type() {
            DataType::List(item) => {
                ensure_integer(item.data_type())?;
                let lists = array.as_list::<i32>().clone();
                let items = widen(lists.values())?;
                Repr::List(ListValues { lists, items })
            }
            DataType::LargeList(item) => {
                ensure_integer(item.data_type())?;
                let lists = array.as_list::<i64>().clone();
                let items = widen(lists.values())?;
                Repr::LargeList(ListValues { lists, items })
            }
            other => {
                ensure_integer(other)?;
                Repr::Single(widen(&array)?)
            }
        };
        Ok(Self { repr })
    }

    /// Whether a document may hold more than one value.
    pub fn is_multi_valued(&self) -> bool {
        !matches!(self.repr, Repr::Single(_))
    }
}

impl From<Int64Array> for ArrowDocValues {
    fn from(array: Int64Array) -> Self {
        Self {
            repr: Repr::Single(array),
        }
    }
}

fn ensure_integer(dtype: &DataType) -> Result<()> {
    if dtype.is_integer() || matches!(dtype, DataType::Timestamp(_, _) | DataType::Date64) {
        Ok(())
    } else {
        Err(Error::InvalidArgumentError(format!(
            "facet fields must hold integer values, got {dtype}"
        )))
    }
}

fn widen(array: &ArrayRef) -> Result<Int64Array> {
    if array.data_type() == &DataType::Int64 {
        return Ok(array.as_primitive::<Int64Type>().clone());
    }
    // Unsafe cast: a reading that does not fit in i64 fails instead of
    // turning into a null that would be skipped as missing.
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    let widened = cast_with_options(array, &DataType::Int64, &options)?;
    Ok(widened.as_primitive::<Int64Type>().clone())
}

impl<O: OffsetSizeTrait> ListValues<O> {
    #[inline]
    fn range(&self, doc: DocId) -> Option<Range<usize>> {
        if doc >= self.lists.len() || self.lists.is_null(doc) {
            return None;
        }
        let offsets = self.lists.value_offsets();
        Some(offsets[doc].as_usize()..offsets[doc + 1].as_usize())
    }

    fn value_count(&self, doc: DocId) -> usize {
        let Some(range) = self.range(doc) else {
            return 0;
        };
        if self.items.null_count() == 0 {
            range.len()
        } else {
            range.filter(|&i| self.items.is_valid(i)).count()
        }
    }

    fn value_at(&self, doc: DocId, idx: usize) -> Option<i64> {
        let range = self.range(doc)?;
        if self.items.null_count() == 0 {
            let pos = range.start.checked_add(idx)?;
            return (pos < range.end).then(|| self.items.value(pos));
        }
        range
            .filter(|&i| self.items.is_valid(i))
            .nth(idx)
            .map(|i| self.items.value(i))
    }

    fn for_each_value<F: FnMut(i64)>(&self, doc: DocId, mut f: F) {
        let Some(range) = self.range(doc) else {
            return;
        };
        if self.items.null_count() == 0 {
            range.for_each(|i| f(self.items.value(i)));
        } else {
            range
                .filter(|&i| self.items.is_valid(i))
                .for_each(|i| f(self.items.value(i)));
        }
    }
}

impl DocValues for ArrowDocValues {
    fn num_docs(&self) -> usize {
        match &self.repr {
            Repr::Single(a) => a.len(),
            Repr::List(l) => l.lists.len(),
            Repr::LargeList(l) => l.lists.len(),
        }
    }

    #[inline]
    fn value_count(&self, doc: DocId) -> usize {
        match &self.repr {
            Repr::Single(a) => usize::from(doc < a.len() && a.is_valid(doc)),
            Repr::List(l) => l.value_count(doc),
            Repr::LargeList(l) => l.value_count(doc),
        }
    }

    #[inline]
    fn value_at(&self, doc: DocId, idx: usize) -> Option<i64> {
        match &self.repr {
            Repr::Single(a) => {
                (idx == 0 && doc < a.len() && a.is_valid(doc)).then(|| a.value(doc))
            }
            Repr::List(l) => l.value_at(doc, idx),
            Repr::LargeList(l) => l.value_at(doc, idx),
        }
    }

    fn for_each_value<F>(&self, doc: DocId, mut f: F)
    where
        F: FnMut(i64),
        Self: Sized,
    {
        match &self.repr {
            Repr::Single(_) => {
                if let Some(v) = self.value_at(doc, 0) {
                    f(v);
                }
            }
            Repr::List(l) => l.for_each_value(doc, f),
            Repr::LargeList(l) => l.for_each_value(doc, f),
        }
    }
}
