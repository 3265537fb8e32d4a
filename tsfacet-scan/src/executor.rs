//! Parallel execution of a latest facet over many segments.

use rayon::prelude::*;
use tsfacet_aggregate::{LatestFacet, MapPool, Paginator, PartialResult, merge};
use tsfacet_column::Segment;
use tsfacet_result::{Error, Result};

use crate::cancel::CancellationFlag;
use crate::config::FacetConfig;
use crate::request::FacetRequest;
use crate::scan::scan_with_header;

/// Runs latest facet requests: parallel segment scans, a barrier, an ordered
/// merge and pagination.
///
/// Segments are scanned concurrently, each into its own pooled map, but
/// partials are merged in segment order, so the result never depends on
/// which scan finished first.
pub struct LatestFacetExecutor {
    config: FacetConfig,
    pool: MapPool,
    workers: Option<rayon::ThreadPool>,
}

impl LatestFacetExecutor {
    pub fn new(config: FacetConfig) -> Result<Self> {
        let pool = MapPool::new(config.pool.clone());
        Self::with_pool(config, pool)
    }

    /// Share an existing map arena, e.g. across executors.
    pub fn with_pool(config: FacetConfig, pool: MapPool) -> Result<Self> {
        let workers = match config.scan.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("tsfacet-scan-{i}"))
                    .build()
                    .map_err(|e| Error::Internal(format!("failed to start scan workers: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            config,
            pool,
            workers,
        })
    }

    pub fn config(&self) -> &FacetConfig {
        &self.config
    }

    pub fn pool(&self) -> &MapPool {
        &self.pool
    }

    /// Scan every segment and return the partials in segment order.
    ///
    /// The first failing scan aborts the collection; segments not yet started
    /// are skipped and every map already checked out goes back to the pool.
    pub fn collect<S: Segment>(
        &self,
        segments: &[S],
        request: &FacetRequest,
        cancel: &CancellationFlag,
    ) -> Result<Vec<PartialResult>> {
        request.validate()?;
        let header = request.header()?;

        let scan_all = || {
            segments
                .par_iter()
                .map(|segment| {
                    scan_with_header(
                        segment,
                        request,
                        header.clone(),
                        &self.pool,
                        &self.config.scan,
                        cancel,
                    )
                })
                .collect::<Result<Vec<_>>>()
        };
        let partials = match &self.workers {
            Some(workers) => workers.install(scan_all)?,
            None => scan_all()?,
        };

        // A flag raised after the last scan still cancels the query.
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(partials)
    }

    /// Scan, merge in segment order and paginate.
    pub fn execute<S: Segment>(
        &self,
        segments: &[S],
        request: &FacetRequest,
        cancel: &CancellationFlag,
    ) -> Result<LatestFacet> {
        tracing::debug!(
            facet = %request.name,
            segments = segments.len(),
            "executing latest facet"
        );
        let partials = self.collect(segments, request, cancel)?;
        self.finish(request, partials)
    }

    /// Coordinator path: merge partials received as transport bytes, in the
    /// order given, and paginate.
    pub fn execute_partials<B: AsRef<[u8]>>(
        &self,
        request: &FacetRequest,
        encoded: &[B],
    ) -> Result<LatestFacet> {
        request.validate()?;
        let partials = encoded
            .iter()
            .map(|bytes| PartialResult::from_bytes_pooled(bytes.as_ref(), &self.pool))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            facet = %request.name,
            partials = partials.len(),
            "decoded latest facet partials"
        );
        self.finish(request, partials)
    }

    fn finish(&self, request: &FacetRequest, partials: Vec<PartialResult>) -> Result<LatestFacet> {
        let merged = merge(request.header()?, self.pool.acquire(), partials)?;
        let facet = merged.paginate(&Paginator::new(self.config.key_order))?;
        tracing::debug!(
            facet = %facet.name,
            keys = facet.total_distinct_keys,
            page = facet.entries.len(),
            "latest facet ready"
        );
        Ok(facet)
    }
}

impl std::fmt::Debug for LatestFacetExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestFacetExecutor")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .field("threads", &self.workers.as_ref().map(|w| w.current_num_threads()))
            .finish()
    }
}
