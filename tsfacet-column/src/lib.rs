//! Value sources feeding the tsfacet aggregation core.
//!
//! A segment scan reads three integer fields per document: the grouping key,
//! the timestamp and the value. This crate defines the [`DocValues`]
//! capability the aggregator reads through, and the [`Segment`] trait that
//! hands out one `DocValues` per field.
//!
//! Backings are chosen when a segment is constructed, never by inspecting
//! types during a scan:
//!
//! - [`ArrowDocValues`] / [`RecordBatchSegment`]: in-memory Arrow columns,
//!   single-valued integer arrays or multi-valued integer lists
//! - [`ParquetSegmentFile`]: an on-disk Parquet file where each row group is
//!   one segment
//! - [`FixtureDocValues`] / [`FixtureSegment`]: literal per-document values for
//!   tests and examples
//!
//! Documents are always visited in ascending [`DocId`] order, which makes
//! timestamp ties resolve deterministically downstream.

pub mod arrow_values;
pub mod doc_values;
pub mod fixture;
pub mod parquet_file;
pub mod segment;

pub use arrow_values::ArrowDocValues;
pub use doc_values::{DocId, DocValues};
pub use fixture::{FixtureDocValues, FixtureSegment};
pub use parquet_file::{ParquetSegmentFile, write_segment_file};
pub use segment::{RecordBatchSegment, Segment, SegmentId};

pub use tsfacet_result::{Error, Result};
