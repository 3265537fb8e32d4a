#![allow(dead_code)]

use tsfacet_aggregate::{FacetHeader, MapPool, PartialResult, SegmentAggregator};
use tsfacet_column::FixtureDocValues;
use tsfacet_test_utils::Document;

pub fn header() -> FacetHeader {
    FacetHeader::new("latest_reading", 10, 0)
}

/// Fold `docs` in order through one aggregator.
pub fn collect(pool: &MapPool, docs: &[Document]) -> PartialResult {
    let keys = FixtureDocValues::single(docs.iter().map(|d| d.key));
    let ts = FixtureDocValues::single(docs.iter().map(|d| d.ts));
    let values = FixtureDocValues::single(docs.iter().map(|d| d.value));
    let mut agg = SegmentAggregator::new(pool.acquire());
    for doc in 0..docs.len() {
        agg.on_document(doc, &keys, &values, &ts).unwrap();
    }
    agg.build(header()).unwrap()
}

pub fn triples(partial_entries: &tsfacet_aggregate::EntryMap) -> Vec<(i64, i64, i32)> {
    let mut out: Vec<_> = partial_entries
        .iter()
        .map(|(&k, e)| (k, e.ts, e.value))
        .collect();
    out.sort_unstable();
    out
}
