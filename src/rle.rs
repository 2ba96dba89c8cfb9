//! Run-length statistics
//!
//! Byte-oriented run-length coding, used to measure how much redundancy the
//! delta stream carries. The measured size is reported; the compressed
//! artifact itself is produced by the entropy coder.
//!
//! # Format
//!
//! ```text
//! 0,0,0,0,1,1,1,1,1,1,1,1,1,1,1,1,0,0,0,0  ->  (4,0) (12,1) (4,0)
//! serialized: [4, 0, 12, 1, 4, 0]
//! ```
//!
//! Counts are in `1..=255`; longer runs are split into several pairs.

use crate::error::CodecError;

/// Longest run one pair can describe.
pub const MAX_RUN: usize = u8::MAX as usize;

/// One `(count, value)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub count: u8,
    pub value: u8,
}

impl Run {
    #[inline]
    pub const fn new(count: u8, value: u8) -> Self {
        Self { count, value }
    }
}

/// Iterate the maximal runs of `data`, capped at [`MAX_RUN`].
fn runs(data: &[u8]) -> impl Iterator<Item = Run> + '_ {
    let mut pos = 0;
    core::iter::from_fn(move || {
        let value = *data.get(pos)?;
        let count = data[pos..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();
        pos += count;
        // take(MAX_RUN) bounds count to 1..=255
        Some(Run::new(count as u8, value))
    })
}

/// Run-length encode a byte stream.
#[must_use]
pub fn encode(data: &[u8]) -> Vec<Run> {
    runs(data).collect()
}

/// Expand runs back into bytes.
#[must_use]
pub fn decode(runs: &[Run]) -> Vec<u8> {
    let total = runs.iter().map(|r| r.count as usize).sum();
    let mut out = Vec::with_capacity(total);
    for run in runs {
        out.resize(out.len() + run.count as usize, run.value);
    }
    out
}

/// Size in bytes of the serialized encoding of `data`, without building it.
#[must_use]
pub fn encoded_len(data: &[u8]) -> usize {
    runs(data).count() * 2
}

/// Serialize runs as `count, value` byte pairs.
#[must_use]
pub fn to_bytes(runs: &[Run]) -> Vec<u8> {
    runs.iter().flat_map(|r| [r.count, r.value]).collect()
}

/// Parse `count, value` byte pairs.
///
/// # Errors
///
/// Returns [`CodecError::InvalidRunLength`] if the length is odd or a pair
/// has a zero count.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<Run>, CodecError> {
    if bytes.len() % 2 != 0 {
        return Err(CodecError::InvalidRunLength(format!(
            "odd length {}",
            bytes.len()
        )));
    }
    bytes
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| match pair[0] {
            0 => Err(CodecError::InvalidRunLength(format!("zero count at pair {i}"))),
            count => Ok(Run::new(count, pair[1])),
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for run-heavy data: a few distinct values with long repeats.
    fn runny_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec((0u8..3, 1usize..600), 0..8).prop_map(|parts| {
            parts
                .into_iter()
                .flat_map(|(v, n)| std::iter::repeat(v).take(n))
                .collect()
        })
    }

    proptest! {
        /// Property: decode(encode(x)) == x.
        #[test]
        fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(decode(&encode(&data)), data);
        }

        /// Property: long runs round-trip and counts stay within 1..=255.
        #[test]
        fn prop_counts_in_range(data in runny_strategy()) {
            let runs = encode(&data);
            prop_assert!(runs.iter().all(|r| r.count >= 1));
            prop_assert_eq!(decode(&runs), data);
        }

        /// Property: serialization round-trips and matches encoded_len.
        #[test]
        fn prop_bytes_roundtrip(data in runny_strategy()) {
            let runs = encode(&data);
            let bytes = to_bytes(&runs);
            prop_assert_eq!(bytes.len(), encoded_len(&data));
            prop_assert_eq!(from_bytes(&bytes).unwrap(), runs);
        }
    }
}
