//! Per-segment scan driver.

use tsfacet_aggregate::{FacetHeader, MapPool, PartialResult, SegmentAggregator};
use tsfacet_column::Segment;
use tsfacet_result::{Error, Result};

use crate::cancel::CancellationFlag;
use crate::config::ScanConfig;
use crate::request::FacetRequest;

/// Scan one segment into a [`PartialResult`].
///
/// The three columns are resolved once up front. Documents are visited in
/// ascending order and `cancel` is polled every
/// `config.cancel_check_interval` documents; a raised flag abandons the scan
/// with [`Error::Cancelled`] and the map goes back to `pool`.
pub fn scan_segment<S: Segment>(
    segment: &S,
    request: &FacetRequest,
    pool: &MapPool,
    config: &ScanConfig,
    cancel: &CancellationFlag,
) -> Result<PartialResult> {
    let header = request.header()?;
    scan_with_header(segment, request, header, pool, config, cancel)
}

pub(crate) fn scan_with_header<S: Segment>(
    segment: &S,
    request: &FacetRequest,
    header: FacetHeader,
    pool: &MapPool,
    config: &ScanConfig,
    cancel: &CancellationFlag,
) -> Result<PartialResult> {
    let keys = segment.column(&request.key_field)?;
    let values = segment.column(&request.value_field)?;
    let timestamps = segment.column(&request.ts_field)?;

    let num_docs = segment.num_docs();
    let interval = config.cancel_check_interval.max(1);
    tracing::trace!(segment = %segment.id(), docs = num_docs, "scanning segment");

    let mut aggregator = SegmentAggregator::new(pool.acquire());
    for doc in 0..num_docs {
        if doc % interval == 0 && cancel.is_cancelled() {
            tracing::debug!(segment = %segment.id(), docs = doc, "segment scan cancelled");
            return Err(Error::Cancelled);
        }
        aggregator.on_document(doc, &keys, &values, &timestamps)?;
    }

    let partial = aggregator.build(header)?;
    tracing::debug!(
        segment = %segment.id(),
        docs = num_docs,
        keys = partial.total_distinct_keys(),
        "segment scan finished"
    );
    Ok(partial)
}
