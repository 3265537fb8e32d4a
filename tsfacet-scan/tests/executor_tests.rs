use std::sync::Arc;

use arrow::array::{Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};

use tsfacet_aggregate::{KeyOrder, LatestEntry, MapPool};
use tsfacet_column::{
    FixtureSegment, ParquetSegmentFile, RecordBatchSegment, Segment, write_segment_file,
};
use tsfacet_scan::{
    CancellationFlag, Error, FacetConfig, FacetRequest, LatestFacetExecutor, ScanConfig,
    scan_segment,
};
use tsfacet_test_utils::{
    DocStreamShape, Document, as_triples, expected_latest, merge_expected, random_documents,
    split_into_segments,
};

const FIELDS: (&str, &str, &str) = ("sensor", "ts", "reading");

fn request() -> FacetRequest {
    FacetRequest::new("latest_reading", "sensor", "reading", "ts")
}

fn fixture(id: u32, docs: &[Document]) -> FixtureSegment {
    let tuples: Vec<_> = docs.iter().map(Document::as_tuple).collect();
    FixtureSegment::from_triples(id, FIELDS, &tuples)
}

fn triples(entries: &[LatestEntry]) -> Vec<(i64, i64, i32)> {
    entries.iter().map(|e| (e.key, e.ts, e.value)).collect()
}

fn executor(threads: Option<usize>) -> LatestFacetExecutor {
    let config = FacetConfig {
        scan: ScanConfig {
            threads,
            cancel_check_interval: 16,
        },
        ..FacetConfig::default()
    };
    LatestFacetExecutor::new(config).unwrap()
}

#[test]
fn two_segments_merge_into_one_page() {
    tsfacet_test_utils::init_tracing_for_tests();

    let segments = vec![
        fixture(
            0,
            &[
                Document::new(1, 10, 100),
                Document::new(1, 20, 200),
                Document::new(2, 5, 50),
            ],
        ),
        fixture(1, &[Document::new(1, 15, 150), Document::new(3, 7, 70)]),
    ];
    let facet = executor(None)
        .execute(&segments, &request(), &CancellationFlag::new())
        .unwrap();
    assert_eq!(facet.name, "latest_reading");
    assert_eq!(facet.total_distinct_keys, 3);
    assert_eq!(
        triples(&facet.entries),
        vec![(1, 20, 200), (2, 5, 50), (3, 7, 70)]
    );

    let second_page = executor(None)
        .execute(
            &segments,
            &request().with_start(2).with_size(5),
            &CancellationFlag::new(),
        )
        .unwrap();
    assert_eq!(second_page.total_distinct_keys, 3);
    assert_eq!(triples(&second_page.entries), vec![(3, 7, 70)]);
}

#[test]
fn equal_timestamps_resolve_by_segment_order() {
    let segments = vec![
        fixture(0, &[Document::new(1, 10, 1)]),
        fixture(1, &[Document::new(1, 10, 2)]),
    ];
    let facet = executor(Some(2))
        .execute(&segments, &request(), &CancellationFlag::new())
        .unwrap();
    assert_eq!(triples(&facet.entries), vec![(1, 10, 1)]);
}

#[test]
fn no_segments_yield_an_empty_facet() {
    let segments: Vec<FixtureSegment> = Vec::new();
    let facet = executor(None)
        .execute(&segments, &request(), &CancellationFlag::new())
        .unwrap();
    assert_eq!(facet.total_distinct_keys, 0);
    assert!(facet.entries.is_empty());
}

#[test]
fn parallel_execution_matches_the_model() {
    tsfacet_test_utils::init_tracing_for_tests();

    for seed in 0..8u64 {
        let docs = random_documents(seed, DocStreamShape::default());
        let parts = split_into_segments(&docs, 1 + (seed as usize % 6));
        let segments: Vec<_> = parts
            .iter()
            .enumerate()
            .map(|(i, part)| fixture(i as u32, part))
            .collect();
        let expected = merge_expected(
            &parts
                .iter()
                .map(|part| expected_latest(part))
                .collect::<Vec<_>>(),
        );
        let all = as_triples(&expected);

        for threads in [None, Some(1), Some(4)] {
            let facet = executor(threads)
                .execute(
                    &segments,
                    &request().with_start(3).with_size(20),
                    &CancellationFlag::new(),
                )
                .unwrap();
            assert_eq!(facet.total_distinct_keys, expected.len() as u64, "seed {seed}");
            let window: Vec<_> = all.iter().copied().skip(3).take(20).collect();
            assert_eq!(triples(&facet.entries), window, "seed {seed} threads {threads:?}");
        }
    }
}

#[test]
fn descending_key_order() {
    let segments = vec![fixture(
        0,
        &[
            Document::new(1, 1, 1),
            Document::new(2, 2, 2),
            Document::new(3, 3, 3),
        ],
    )];
    let config = FacetConfig {
        key_order: KeyOrder::Descending,
        ..FacetConfig::default()
    };
    let facet = LatestFacetExecutor::new(config)
        .unwrap()
        .execute(&segments, &request().with_size(2), &CancellationFlag::new())
        .unwrap();
    assert_eq!(triples(&facet.entries), vec![(3, 3, 3), (2, 2, 2)]);
}

#[test]
fn cancellation_aborts_and_returns_maps() {
    let docs = random_documents(7, DocStreamShape::default());
    let segments: Vec<_> = split_into_segments(&docs, 4)
        .iter()
        .enumerate()
        .map(|(i, part)| fixture(i as u32, part))
        .collect();

    let exec = executor(Some(2));
    let cancel = CancellationFlag::new();
    cancel.cancel();
    let err = exec.execute(&segments, &request(), &cancel).unwrap_err();
    assert!(matches!(err, Error::Cancelled));

    let pool = exec.pool();
    assert!(pool.acquired_total() >= 1);
    assert_eq!(pool.pooled() as u64, pool.allocated_total());
}

#[test]
fn invalid_requests_fail_before_scanning() {
    let segments = vec![fixture(0, &[Document::new(1, 1, 1)])];
    let exec = executor(None);
    for bad in [request().with_size(-1), request().with_start(-1)] {
        let err = exec
            .execute(&segments, &bad, &CancellationFlag::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
    }
    assert_eq!(exec.pool().acquired_total(), 0);

    let missing = FacetRequest::new("latest_reading", "sensor", "reading", "time");
    let err = exec
        .execute(&segments, &missing, &CancellationFlag::new())
        .unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound(f) if f == "time"));
}

#[test]
fn coordinator_merges_transported_partials() {
    let docs = random_documents(42, DocStreamShape::default());
    let segments: Vec<_> = split_into_segments(&docs, 5)
        .iter()
        .enumerate()
        .map(|(i, part)| fixture(i as u32, part))
        .collect();

    // Each worker scans its own segment with its own pool.
    let encoded: Vec<Vec<u8>> = segments
        .iter()
        .map(|segment| {
            scan_segment(
                segment,
                &request(),
                &MapPool::default(),
                &ScanConfig::default(),
                &CancellationFlag::new(),
            )
            .unwrap()
            .to_bytes()
        })
        .collect();

    let exec = executor(None);
    let remote = exec.execute_partials(&request(), &encoded).unwrap();
    let local = exec
        .execute(&segments, &request(), &CancellationFlag::new())
        .unwrap();
    assert_eq!(remote, local);

    let err = exec
        .execute_partials(&request().with_start(1), &encoded)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgumentError(_)));

    let err = exec
        .execute_partials(&request(), &[vec![1u8, 2, 3]])
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

fn readings_batch(rows: &[(i64, Option<i64>, Option<i64>)]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("sensor", DataType::Int64, false),
        Field::new("ts", DataType::Int64, true),
        Field::new("reading", DataType::Int64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.0))),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
        ],
    )
    .unwrap()
}

#[test]
fn record_batch_and_parquet_segments_agree() {
    tsfacet_test_utils::init_tracing_for_tests();

    let batches = vec![
        readings_batch(&[(1, Some(10), Some(100)), (1, Some(20), Some(200)), (2, Some(5), Some(50))]),
        readings_batch(&[(1, Some(15), Some(150)), (3, Some(7), Some(70)), (3, None, Some(71))]),
        readings_batch(&[(4, Some(1), None), (2, Some(5), Some(55))]),
    ];
    let in_memory: Vec<_> = batches
        .iter()
        .enumerate()
        .map(|(i, b)| RecordBatchSegment::new(i as u32, b.clone()))
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.parquet");
    write_segment_file(&path, &batches).unwrap();
    let file = ParquetSegmentFile::open(&path).unwrap();
    let on_disk = file.read_segments(&["sensor", "ts", "reading"]).unwrap();
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk[2].num_docs(), 2);

    let exec = executor(Some(2));
    let a = exec
        .execute(&in_memory, &request(), &CancellationFlag::new())
        .unwrap();
    let b = exec
        .execute(&on_disk, &request(), &CancellationFlag::new())
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(
        triples(&a.entries),
        vec![(1, 20, 200), (2, 5, 50), (3, 7, 70)]
    );
}

#[test]
fn unsigned_keys_beyond_i64_fail_instead_of_vanishing() {
    use arrow::array::UInt64Array;

    let schema = Arc::new(Schema::new(vec![
        Field::new("sensor", DataType::UInt64, false),
        Field::new("ts", DataType::Int64, false),
        Field::new("reading", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(UInt64Array::from(vec![1, u64::MAX])),
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(Int64Array::from(vec![10, 20])),
        ],
    )
    .unwrap();
    let segments = vec![RecordBatchSegment::new(0, batch)];
    let err = executor(None)
        .execute(&segments, &request(), &CancellationFlag::new())
        .unwrap_err();
    assert!(matches!(err, Error::Arrow(_)));
}
