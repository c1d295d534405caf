//! Table-level column statistics from per-partition statistics.
//!
//! Given the ordered partition list of a table and the statistics of one
//! column for some or all of its partitions, [`ColumnStatsAggregator`]
//! produces statistics for the column across the whole table: low and high
//! value, null count and an estimated number of distinct values (NDV).
//!
//! # Extrapolation
//!
//! When only some partitions carry statistics, the missing ones are
//! extrapolated. This assumes a column's values correlate monotonically with
//! the partition order (e.g. a date column of a table partitioned by day).
//! Columns with no such correlation still get bounded NDVs, but their
//! extrapolated low and high values can be far off.
//!
//! # Distinct values
//!
//! NDVs are estimated, in order of preference, from mergeable sketches
//! attached to the partition statistics (see [`NdvEstimator`]), from the
//! average value density of the partitions, or by interpolating between the
//! largest single-partition NDV and the sum of all NDVs (see [`NdvTuner`]).
//! The result always lies between those two bounds.
#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

mod aggregate;
pub use aggregate::*;

mod coalesce;

pub mod config;
pub use config::*;

mod error;
pub use error::*;

mod extrapolate;
mod merge;
mod ndv;
mod ordinal;

pub mod sketch;
pub use sketch::{DecodeError, NdvEstimator, NdvEstimatorFactory};

pub mod value;
pub use value::StatsValue;
