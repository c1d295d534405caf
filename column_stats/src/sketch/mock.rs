//! An exact, deterministic stand-in for a real distinct-value estimator.
//!
//! The "sketch" is the full set of value hashes it has seen, tagged with a
//! family byte. Two sketches can only be merged when their families match.
//! Estimates are exact, which makes test expectations easy to derive.
//!
//! Wire format: one family byte followed by any number of little-endian
//! `u64` hashes.

use std::collections::BTreeSet;

use bytes::{BufMut, Bytes, BytesMut};

use super::{DecodeError, NdvEstimator, NdvEstimatorFactory};

const HASH_SIZE: usize = std::mem::size_of::<u64>();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNdvSketch {
    family: u8,
    hashes: BTreeSet<u64>,
}

impl MockNdvSketch {
    pub fn new(family: u8) -> Self {
        Self {
            family,
            hashes: BTreeSet::new(),
        }
    }

    pub fn with_values(family: u8, values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            family,
            hashes: values.into_iter().collect(),
        }
    }

    pub fn family(&self) -> u8 {
        self.family
    }

    /// Serialized form, ready to be attached to column statistics.
    pub fn to_bytes(&self) -> Bytes {
        self.serialize()
    }
}

impl NdvEstimator for MockNdvSketch {
    fn can_merge(&self, other: &Self) -> bool {
        self.family == other.family
    }

    fn merge_from(&mut self, other: &Self) {
        assert_eq!(self.family, other.family, "merging incompatible sketches");
        self.hashes.extend(other.hashes.iter().copied());
    }

    fn estimate(&self) -> u64 {
        self.hashes.len() as u64
    }

    fn empty_like(&self) -> Self {
        Self::new(self.family)
    }

    fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + self.hashes.len() * HASH_SIZE);
        buf.put_u8(self.family);
        for hash in &self.hashes {
            buf.put_u64_le(*hash);
        }
        buf.freeze()
    }
}

/// Decodes [`MockNdvSketch`]es.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockNdvSketchFactory;

impl NdvEstimatorFactory for MockNdvSketchFactory {
    type Estimator = MockNdvSketch;

    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Estimator, DecodeError> {
        let Some((&family, hashes)) = bytes.split_first() else {
            return Err(DecodeError::new("empty sketch"));
        };
        if hashes.len() % HASH_SIZE != 0 {
            return Err(DecodeError::new(format!(
                "payload of {} bytes is not a multiple of {HASH_SIZE}",
                hashes.len()
            )));
        }

        let hashes = hashes
            .chunks_exact(HASH_SIZE)
            .map(|chunk| {
                let mut word = [0_u8; HASH_SIZE];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect();

        Ok(MockNdvSketch { family, hashes })
    }
}
