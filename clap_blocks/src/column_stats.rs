//! Column statistics aggregation configuration
use std::num::ParseFloatError;

use clap::Parser;
use column_stats::{AggregatorConfig, ConfigError, NdvTuner};
use snafu::{ResultExt, Snafu};

/// Parse an NDV tuner weight and validate it lies within `[0, 1]`.
pub fn parse_ndv_tuner(s: &str) -> Result<NdvTuner, NdvTunerError> {
    let value = s.trim().parse::<f64>().context(InvalidSnafu {
        given: s.to_string(),
    })?;
    NdvTuner::try_new(value).context(OutOfRangeSnafu)
}

#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum NdvTunerError {
    #[snafu(display("Unable to parse NDV tuner from `{given}`: {source}"))]
    Invalid {
        given: String,
        source: ParseFloatError,
    },

    #[snafu(display("{source}"))]
    OutOfRange { source: ConfigError },
}

/// Configuration of the column statistics aggregator
#[derive(Debug, Clone, Copy, Parser)]
pub struct ColumnStatsConfig {
    /// Estimate the number of distinct values of partially covered or
    /// sketch-less columns from the average value density of the partitions
    /// (value range divided by distinct values), instead of interpolating
    /// between the distinct-value bounds.
    #[clap(
        long = "stats-ndv-density-function",
        env = "INFLUXDB_IOX_STATS_NDV_DENSITY_FUNCTION"
    )]
    pub use_density_function: bool,

    /// Weight in `[0, 1]` used to interpolate the number of distinct values
    /// between its lower bound (largest per-partition count, 0) and its upper
    /// bound (sum of per-partition counts, 1).
    ///
    /// Only used when neither sketches nor the density function apply.
    #[clap(
        long = "stats-ndv-tuner",
        default_value = "0.0",
        value_parser = parse_ndv_tuner,
        env = "INFLUXDB_IOX_STATS_NDV_TUNER"
    )]
    pub ndv_tuner: NdvTuner,
}

impl ColumnStatsConfig {
    /// Aggregator configuration described by these options.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig::default()
            .with_density_function(self.use_density_function)
            .with_ndv_tuner(self.ndv_tuner)
    }
}
