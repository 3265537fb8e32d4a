//! Transport encoding of [`PartialResult`].
//!
//! Partial results travel from the worker that scanned a segment to the
//! coordinator that merges them. The payload is a bitcode-encoded frame:
//!
//! ```text
//! stream_type, version,
//! facet_name, requested_size, requested_start, total_distinct_keys,
//! keys[], timestamps[], values[]      (one entry per key, ascending key order)
//! ```
//!
//! Entries are written column-wise and sorted by key so the same partial
//! always encodes to the same bytes.

use bitcode::{Decode, Encode};
use tsfacet_result::{Error, Result};

use crate::entry::{Entry, EntryMap};
use crate::partial::{FacetHeader, PartialResult};
use crate::pool::{MapPool, PooledMap};

/// Stream type tag identifying latest-facet partials.
pub const STREAM_TYPE: &str = "latest";
/// Current frame version.
pub const WIRE_VERSION: u8 = 1;

#[derive(Encode, Decode)]
struct PartialFrame {
    stream_type: String,
    version: u8,
    facet_name: String,
    requested_size: u32,
    requested_start: u32,
    total_distinct_keys: u64,
    keys: Vec<i64>,
    timestamps: Vec<i64>,
    values: Vec<i32>,
}

impl PartialResult {
    /// Encode for transport.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut rows: Vec<(i64, Entry)> = self.entries().iter().map(|(&k, &e)| (k, e)).collect();
        rows.sort_unstable_by_key(|(k, _)| *k);

        let header = self.header();
        let frame = PartialFrame {
            stream_type: STREAM_TYPE.to_string(),
            version: WIRE_VERSION,
            facet_name: header.name.clone(),
            requested_size: header.requested_size,
            requested_start: header.requested_start,
            total_distinct_keys: self.total_distinct_keys(),
            keys: rows.iter().map(|(k, _)| *k).collect(),
            timestamps: rows.iter().map(|(_, e)| e.ts).collect(),
            values: rows.iter().map(|(_, e)| e.value).collect(),
        };
        bitcode::encode(&frame)
    }

    /// Decode a partial into a freshly allocated map.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_into(bytes, PooledMap::detached(EntryMap::default()))
    }

    /// Decode a partial into a map checked out of `pool`.
    pub fn from_bytes_pooled(bytes: &[u8], pool: &MapPool) -> Result<Self> {
        decode_into(bytes, pool.acquire())
    }
}

fn decode_into(bytes: &[u8], mut entries: PooledMap) -> Result<PartialResult> {
    let frame: PartialFrame = bitcode::decode(bytes).map_err(Error::decode)?;

    if frame.stream_type != STREAM_TYPE {
        return Err(Error::Decode(format!(
            "unexpected stream type '{}', expected '{STREAM_TYPE}'",
            frame.stream_type
        )));
    }
    if frame.version != WIRE_VERSION {
        return Err(Error::Decode(format!(
            "unsupported partial result version {}",
            frame.version
        )));
    }
    let n = frame.keys.len();
    if frame.timestamps.len() != n || frame.values.len() != n {
        return Err(Error::Decode(format!(
            "entry columns disagree in length: {} keys, {} timestamps, {} values",
            n,
            frame.timestamps.len(),
            frame.values.len()
        )));
    }
    if frame.total_distinct_keys != n as u64 {
        return Err(Error::Decode(format!(
            "total_distinct_keys is {} but {} entries were sent",
            frame.total_distinct_keys, n
        )));
    }

    entries.clear();
    entries.reserve(n);
    for ((key, ts), value) in frame.keys.into_iter().zip(frame.timestamps).zip(frame.values) {
        if entries.insert(key, Entry::new(ts, value)).is_some() {
            return Err(Error::Decode(format!("duplicate key {key} in partial result")));
        }
    }

    let header = FacetHeader::new(frame.facet_name, frame.requested_size, frame.requested_start);
    Ok(PartialResult::new(header, entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(rows: &[(i64, i64, i32)]) -> PartialResult {
        let mut map = PooledMap::detached(EntryMap::default());
        for &(k, ts, v) in rows {
            map.insert(k, Entry::new(ts, v));
        }
        PartialResult::new(FacetHeader::new("latest_reading", 5, 2), map)
    }

    #[test]
    fn decoded_partial_matches_original() {
        let original = partial(&[(3, 7, 70), (-1, 20, 200), (9, 1, -5)]);
        let decoded = PartialResult::from_bytes(&original.to_bytes()).unwrap();
        assert_eq!(decoded.header(), original.header());
        assert_eq!(decoded.total_distinct_keys(), 3);
        assert_eq!(decoded.entries(), original.entries());
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = partial(&[(1, 1, 1), (2, 2, 2), (3, 3, 3)]);
        let b = partial(&[(3, 3, 3), (1, 1, 1), (2, 2, 2)]);
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn pooled_decode_uses_the_pool() {
        let pool = MapPool::default();
        let decoded = PartialResult::from_bytes_pooled(&partial(&[(1, 1, 1)]).to_bytes(), &pool)
            .unwrap();
        assert_eq!(pool.acquired_total(), 1);
        drop(decoded);
        assert_eq!(pool.pooled(), 1);
    }

    fn frame_bytes(mutate: impl FnOnce(&mut PartialFrame)) -> Vec<u8> {
        let mut frame = PartialFrame {
            stream_type: STREAM_TYPE.to_string(),
            version: WIRE_VERSION,
            facet_name: "f".into(),
            requested_size: 10,
            requested_start: 0,
            total_distinct_keys: 2,
            keys: vec![1, 2],
            timestamps: vec![1, 2],
            values: vec![1, 2],
        };
        mutate(&mut frame);
        bitcode::encode(&frame)
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(PartialResult::from_bytes(&frame_bytes(|_| {})).is_ok());

        let cases: Vec<Vec<u8>> = vec![
            frame_bytes(|f| f.stream_type = "terms".into()),
            frame_bytes(|f| f.version = 9),
            frame_bytes(|f| {
                f.values.pop();
            }),
            frame_bytes(|f| f.total_distinct_keys = 3),
            frame_bytes(|f| f.keys = vec![4, 4]),
            vec![0xde, 0xad],
        ];
        for bytes in cases {
            assert!(matches!(
                PartialResult::from_bytes(&bytes),
                Err(Error::Decode(_))
            ));
        }
    }
}
