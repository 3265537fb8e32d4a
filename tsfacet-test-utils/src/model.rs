//! Brute-force reference model of latest-per-key aggregation.

use std::collections::BTreeMap;

/// One document with optional single-valued readings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Document {
    pub key: Option<i64>,
    pub ts: Option<i64>,
    pub value: Option<i64>,
}

impl Document {
    pub fn new(key: i64, ts: i64, value: i64) -> Self {
        Self {
            key: Some(key),
            ts: Some(ts),
            value: Some(value),
        }
    }

    pub fn as_tuple(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        (self.key, self.ts, self.value)
    }
}

/// For each key, the first document (in order) carrying the maximum timestamp.
///
/// Documents missing a timestamp or a value never contribute.
pub fn expected_latest(docs: &[Document]) -> BTreeMap<i64, (i64, i32)> {
    let mut out: BTreeMap<i64, (i64, i32)> = BTreeMap::new();
    for doc in docs {
        let (Some(key), Some(ts), Some(value)) = (doc.key, doc.ts, doc.value) else {
            continue;
        };
        match out.get(&key) {
            Some(&(current, _)) if current >= ts => {}
            _ => {
                out.insert(key, (ts, value as i32));
            }
        }
    }
    out
}

/// Fold already-reduced maps in order, earlier maps winning timestamp ties.
pub fn merge_expected(parts: &[BTreeMap<i64, (i64, i32)>]) -> BTreeMap<i64, (i64, i32)> {
    let mut out: BTreeMap<i64, (i64, i32)> = BTreeMap::new();
    for part in parts {
        for (&key, &(ts, value)) in part {
            match out.get(&key) {
                Some(&(current, _)) if current >= ts => {}
                _ => {
                    out.insert(key, (ts, value));
                }
            }
        }
    }
    out
}
