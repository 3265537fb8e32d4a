//! Execution of latest facets over independently scanned segments.
//!
//! [`scan_segment`] turns one segment into a partial result.
//! [`LatestFacetExecutor`] fans a request out over many segments with rayon,
//! waits for every partial, merges them in segment order and returns the
//! requested page. Partials that arrive as bytes from remote workers go
//! through [`LatestFacetExecutor::execute_partials`] instead.

pub mod cancel;
pub mod config;
pub mod executor;
pub mod request;
pub mod scan;

pub use cancel::CancellationFlag;
pub use config::{FacetConfig, ScanConfig};
pub use executor::LatestFacetExecutor;
pub use request::FacetRequest;
pub use scan::scan_segment;

pub use tsfacet_result::{Error, Result};
