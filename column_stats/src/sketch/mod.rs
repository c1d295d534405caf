//! The distinct-value estimator contract consumed by the aggregator.
//!
//! The aggregator never looks inside a sketch. It only needs to decode one
//! from bytes, check that two are compatible, fold one into an accumulator
//! and ask for a cardinality estimate. Anything that satisfies
//! [`NdvEstimator`] (HyperLogLog, FM sketches, ...) can be plugged in through
//! an [`NdvEstimatorFactory`].

use std::fmt::Debug;

use bytes::Bytes;
use snafu::Snafu;

#[allow(missing_docs)]
pub mod mock;

/// Sketch bytes could not be decoded.
#[derive(Debug, Snafu)]
#[snafu(display("failed to decode NDV sketch: {reason}"))]
pub struct DecodeError {
    reason: String,
}

impl DecodeError {
    /// Create a new decode error with a human readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A mergeable distinct-value estimator.
pub trait NdvEstimator: Debug + Send + Sized {
    /// Returns true if `other` was built with the same family and parameters
    /// and can therefore be folded into `self`.
    fn can_merge(&self, other: &Self) -> bool;

    /// Fold `other` into `self`.
    ///
    /// Only defined when [`can_merge`](Self::can_merge) returned true.
    fn merge_from(&mut self, other: &Self);

    /// Estimated number of distinct values.
    fn estimate(&self) -> u64;

    /// A zero-state estimator with the same parameters as `self`.
    fn empty_like(&self) -> Self;

    /// Serialized state, readable by the matching factory.
    fn serialize(&self) -> Bytes;
}

/// Decodes serialized estimator state.
pub trait NdvEstimatorFactory: Debug + Send + Sync {
    /// The estimator type produced.
    type Estimator: NdvEstimator;

    /// Decode a sketch.
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Estimator, DecodeError>;
}

/// Private accumulator that folds input sketches without touching them.
///
/// The accumulator state is always created with
/// [`NdvEstimator::empty_like`]; input estimators are only ever borrowed.
#[derive(Debug)]
pub(crate) struct SketchAccumulator<E> {
    state: E,
}

impl<E: NdvEstimator> SketchAccumulator<E> {
    pub(crate) fn new_like(template: &E) -> Self {
        Self {
            state: template.empty_like(),
        }
    }

    /// Fold all sketches into a fresh accumulator, `None` if there are none.
    pub(crate) fn merge_all(sketches: &[E]) -> Option<Self> {
        let mut acc = Self::new_like(sketches.first()?);
        for sketch in sketches {
            acc.merge(sketch);
        }
        Some(acc)
    }

    pub(crate) fn merge(&mut self, other: &E) {
        debug_assert!(self.state.can_merge(other));
        self.state.merge_from(other);
    }

    pub(crate) fn estimate(&self) -> u64 {
        self.state.estimate()
    }

    pub(crate) fn into_inner(self) -> E {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::{mock::MockNdvSketch, *};

    #[test]
    fn accumulator_leaves_inputs_untouched() {
        let sketches = vec![
            MockNdvSketch::with_values(1, [1, 2, 3]),
            MockNdvSketch::with_values(1, [3, 4]),
        ];

        let acc = SketchAccumulator::merge_all(&sketches).unwrap();
        assert_eq!(acc.estimate(), 4);
        assert_eq!(sketches[0].estimate(), 3);
        assert_eq!(sketches[1].estimate(), 2);

        let merged = acc.into_inner();
        assert_eq!(merged, MockNdvSketch::with_values(1, [1, 2, 3, 4]));
    }

    #[test]
    fn accumulator_of_nothing() {
        assert!(SketchAccumulator::<MockNdvSketch>::merge_all(&[]).is_none());
    }
}
