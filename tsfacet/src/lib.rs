//! Latest value per key, computed over independently scanned segments.
//!
//! For every distinct key in a document collection this finds the value
//! carried by the document with the greatest timestamp, then returns one
//! page of those `(key, ts, value)` rows together with the total number of
//! distinct keys.
//!
//! ```no_run
//! use tsfacet::{CancellationFlag, FacetConfig, FacetRequest, LatestFacetExecutor, ParquetSegmentFile};
//!
//! # fn main() -> tsfacet::Result<()> {
//! let file = ParquetSegmentFile::open("readings.parquet")?;
//! let segments = file.read_segments(&["sensor", "ts", "reading"])?;
//!
//! let executor = LatestFacetExecutor::new(FacetConfig::from_env())?;
//! let request = FacetRequest::new("latest_reading", "sensor", "reading", "ts").with_size(20);
//! let facet = executor.execute(&segments, &request, &CancellationFlag::new())?;
//! println!("{} sensors, showing {}", facet.total_distinct_keys, facet.entries.len());
//! # Ok(())
//! # }
//! ```

pub use tsfacet_aggregate::{
    DEFAULT_SIZE, DEFAULT_START, Entry, EntryMap, FacetHeader, FacetKey, KeyOrder, LatestEntry,
    LatestFacet, MapPool, MergedResult, Paginator, PartialResult, PoolConfig, PooledMap,
    ResultMerger, STREAM_TYPE, SegmentAggregator, WIRE_VERSION, merge, merge_tree,
};
pub use tsfacet_column::{
    ArrowDocValues, DocId, DocValues, FixtureDocValues, FixtureSegment, ParquetSegmentFile,
    RecordBatchSegment, Segment, SegmentId, write_segment_file,
};
pub use tsfacet_result::{Error, Result};
pub use tsfacet_scan::{
    CancellationFlag, FacetConfig, FacetRequest, LatestFacetExecutor, ScanConfig, scan_segment,
};
