//! Latest-value-per-key aggregation.
//!
//! Computes, for every distinct key, the value carried by the record with the
//! greatest timestamp. Execution has two phases:
//!
//! 1. **Collect**: one [`SegmentAggregator`] per segment folds that segment's
//!    documents into a private map and hands it off as a [`PartialResult`].
//! 2. **Reduce**: a [`ResultMerger`] folds all partials, in a fixed order,
//!    into one [`MergedResult`], which a [`Paginator`] cuts into the final
//!    [`LatestFacet`] page.
//!
//! Both phases use the same rule: an observation replaces the stored entry
//! only if its timestamp is strictly greater, so on ties the entry seen first
//! survives.
//!
//! Maps are checked out of a [`MapPool`] and go back to it when their last
//! owner drops them.

pub mod aggregator;
pub mod entry;
pub mod merge;
pub mod paginate;
pub mod partial;
pub mod pool;
pub mod wire;

pub use aggregator::SegmentAggregator;
pub use entry::{Entry, EntryMap, FacetKey, LatestEntry, fold_entry};
pub use merge::{MergedResult, ResultMerger, merge, merge_tree};
pub use paginate::{KeyOrder, LatestFacet, Paginator};
pub use partial::{DEFAULT_SIZE, DEFAULT_START, FacetHeader, PartialResult};
pub use pool::{MapPool, PoolConfig, PooledMap};
pub use wire::{STREAM_TYPE, WIRE_VERSION};

pub use tsfacet_result::{Error, Result};
