//! Tunables of the distinct-value estimation.

use snafu::{ensure, Snafu};

/// Errors building an [`AggregatorConfig`].
#[derive(Debug, Clone, Copy, Snafu)]
#[expect(missing_docs)]
pub enum ConfigError {
    #[snafu(display("NDV tuner must be within [0, 1], got {value}"))]
    InvalidNdvTuner { value: f64 },
}

/// Weight in `[0, 1]` used to pick a distinct count between its lower bound
/// (largest per-partition count, i.e. partitions fully overlap) and its upper
/// bound (sum of per-partition counts, i.e. partitions are disjoint).
///
/// Only used when no sketch is available and density estimation is disabled.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct NdvTuner(f64);

impl NdvTuner {
    /// Validate the tuner weight.
    pub fn try_new(value: f64) -> Result<Self, ConfigError> {
        ensure!(
            (0.0..=1.0).contains(&value),
            InvalidNdvTunerSnafu { value }
        );
        Ok(Self(value))
    }

    /// Read access to the weight.
    pub fn get(&self) -> f64 {
        self.0
    }

    /// Interpolate between the two bounds, truncating toward zero.
    pub(crate) fn interpolate(&self, lower: u64, higher: u64) -> u64 {
        let spread = higher.saturating_sub(lower) as f64;
        lower.saturating_add((spread * self.0) as u64)
    }
}

/// Configuration of a [`ColumnStatsAggregator`](crate::ColumnStatsAggregator).
///
/// Defaults to tuner-weighted interpolation with a weight of zero, i.e. the
/// conservative "partitions fully overlap" estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregatorConfig {
    /// Estimate distinct counts from the value range divided by the average
    /// per-partition value density, rather than by tuner interpolation.
    pub use_density_function: bool,

    /// Interpolation weight between the distinct-count bounds.
    pub ndv_tuner: NdvTuner,
}

impl AggregatorConfig {
    /// Enable or disable density-based distinct-value estimation.
    pub fn with_density_function(self, use_density_function: bool) -> Self {
        Self {
            use_density_function,
            ..self
        }
    }

    /// Set the tuner weight.
    pub fn with_ndv_tuner(self, ndv_tuner: NdvTuner) -> Self {
        Self { ndv_tuner, ..self }
    }
}
