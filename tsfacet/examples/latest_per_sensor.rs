//! Latest reading per sensor over a parquet file of readings.
//!
//! Writes a small file with three row groups (one per ingest batch), then
//! runs a latest facet over it. `RUST_LOG=debug` shows the scan and merge.
//!
//!     cargo run -p tsfacet --example latest_per_sensor

use std::sync::Arc;

use arrow::array::{Int32Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use tracing_subscriber::EnvFilter;

use tsfacet::{
    CancellationFlag, FacetConfig, FacetRequest, LatestFacetExecutor, ParquetSegmentFile,
    write_segment_file,
};

fn batch(sensors: &[i64], ts: &[Option<i64>], readings: &[i32]) -> tsfacet::Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("sensor", DataType::Int64, false),
        Field::new("ts", DataType::Int64, true),
        Field::new("reading", DataType::Int32, false),
    ]));
    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(sensors.to_vec())),
            Arc::new(Int64Array::from(ts.to_vec())),
            Arc::new(Int32Array::from(readings.to_vec())),
        ],
    )?)
}

fn main() -> tsfacet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("readings.parquet");
    write_segment_file(
        &path,
        &[
            batch(&[1, 1, 2], &[Some(10), Some(20), Some(5)], &[100, 200, 50])?,
            batch(&[1, 3, 4], &[Some(15), Some(7), None], &[150, 70, 400])?,
            batch(&[2, 3, 5], &[Some(9), Some(7), Some(1)], &[90, 71, 500])?,
        ],
    )?;

    let file = ParquetSegmentFile::open(&path)?;
    let segments = file.read_segments(&["sensor", "ts", "reading"])?;
    tracing::info!(path = %path.display(), segments = segments.len(), "opened readings");

    let executor = LatestFacetExecutor::new(FacetConfig::from_env())?;
    let request = FacetRequest::new("latest_reading", "sensor", "reading", "ts").with_size(3);
    let facet = executor.execute(&segments, &request, &CancellationFlag::new())?;

    println!(
        "{} sensors reported; page start={} size={}",
        facet.total_distinct_keys, facet.requested_start, facet.requested_size
    );
    for entry in &facet.entries {
        println!("sensor {:>3}  ts {:>4}  reading {}", entry.key, entry.ts, entry.value);
    }
    let json = serde_json::to_string_pretty(&facet)
        .map_err(|e| tsfacet::Error::Internal(format!("failed to render facet: {e}")))?;
    println!("{json}");
    Ok(())
}
