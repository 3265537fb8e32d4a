use std::collections::BTreeMap;
use std::sync::Once;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod model;

pub use model::{Document, expected_latest, merge_expected};

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            Err(_) => EnvFilter::new("info"),
        };
        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    // Use ctor to run at binary init time to avoid having to call init in every test.
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}

/// Shape of a randomly generated document stream.
#[derive(Clone, Copy, Debug)]
pub struct DocStreamShape {
    pub docs: usize,
    pub key_space: i64,
    pub ts_space: i64,
    /// Probability that a document is missing its timestamp.
    pub missing_ts: f64,
    /// Probability that a document is missing its value.
    pub missing_value: f64,
}

impl Default for DocStreamShape {
    fn default() -> Self {
        Self {
            docs: 2_000,
            key_space: 64,
            // Small enough that timestamp ties are frequent.
            ts_space: 50,
            missing_ts: 0.05,
            missing_value: 0.05,
        }
    }
}

/// Deterministic pseudo-random documents for the given seed.
pub fn random_documents(seed: u64, shape: DocStreamShape) -> Vec<Document> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..shape.docs)
        .map(|_| Document {
            key: Some(rng.random_range(0..shape.key_space)),
            ts: (!rng.random_bool(shape.missing_ts)).then(|| rng.random_range(0..shape.ts_space)),
            value: (!rng.random_bool(shape.missing_value))
                .then(|| rng.random_range(-1_000_000..1_000_000)),
        })
        .collect()
}

/// Split `docs` into `parts` contiguous runs, preserving order.
pub fn split_into_segments(docs: &[Document], parts: usize) -> Vec<Vec<Document>> {
    let parts = parts.max(1);
    let chunk = docs.len().div_ceil(parts).max(1);
    docs.chunks(chunk).map(<[Document]>::to_vec).collect()
}

/// Render a model map as sorted `(key, ts, value)` triples.
pub fn as_triples(map: &BTreeMap<i64, (i64, i32)>) -> Vec<(i64, i64, i32)> {
    map.iter().map(|(&k, &(ts, v))| (k, ts, v)).collect()
}
