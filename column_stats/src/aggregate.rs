//! The column statistics aggregator.

use observability_deps::tracing::{debug, warn};
use snafu::OptionExt;

use bytes::Bytes;
use data_types::{
    AggregateColumnStats, ColumnStats, ColumnStatsData, ColumnStatsObj, Date, Decimal,
    PartitionColumnStats, PartitionStatistics, Timestamp,
};

use crate::{
    coalesce::AdjustedPartitions,
    config::AggregatorConfig,
    error::{MalformedStatsSnafu, MismatchedColumnTypeSnafu, NoStatisticsSnafu, Result},
    extrapolate::extrapolate,
    merge::{Contribution, StatsAccumulator},
    ndv::{estimate_from_density, DensitySum, NdvBounds},
    ordinal::OrdinalIndexMap,
    sketch::{NdvEstimator, NdvEstimatorFactory, SketchAccumulator},
    value::StatsValue,
};

/// Combines per-partition statistics of one column into table-level
/// statistics.
///
/// If every partition of the table contributed, the statistics are merged
/// exactly (low/high/nulls) and the distinct count is estimated from sketches,
/// value density or tuner interpolation, in that order of preference. If
/// only some partitions contributed, the statistics are extrapolated to the
/// full partition list.
///
/// Aggregation is a pure function of its inputs; the aggregator holds no
/// mutable state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct ColumnStatsAggregator<F> {
    config: AggregatorConfig,
    estimators: F,
}

impl<F: NdvEstimatorFactory> ColumnStatsAggregator<F> {
    /// Create an aggregator decoding sketches with `estimators`.
    pub fn new(config: AggregatorConfig, estimators: F) -> Self {
        Self { config, estimators }
    }

    /// Aggregator configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Aggregate type-erased statistics of `column_name`.
    ///
    /// `partition_names` is the table's full, ordered partition list.
    /// `partition_stats` holds the statistics of the partitions that have
    /// them, each carrying exactly one column.
    pub fn aggregate<S: AsRef<str>>(
        &self,
        column_name: &str,
        partition_names: &[S],
        partition_stats: &[PartitionStatistics],
    ) -> Result<ColumnStatsObj> {
        let mut columns = Vec::with_capacity(partition_stats.len());
        for partition in partition_stats {
            let [column] = partition.column_stats.as_slice() else {
                return MalformedStatsSnafu {
                    partition_count: partition.column_stats.len(),
                }
                .fail();
            };
            columns.push((partition.partition_name.as_str(), &column.data));
        }

        let Some((_, first)) = columns.first() else {
            return NoStatisticsSnafu { column_name }.fail();
        };

        let data = match first {
            ColumnStatsData::Boolean(_) => {
                self.aggregate_erased::<bool, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::Long(_) => {
                self.aggregate_erased::<i64, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::Double(_) => {
                self.aggregate_erased::<f64, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::Decimal(_) => {
                self.aggregate_erased::<Decimal, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::Date(_) => {
                self.aggregate_erased::<Date, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::Timestamp(_) => {
                self.aggregate_erased::<Timestamp, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::String(_) => {
                self.aggregate_erased::<String, _>(column_name, partition_names, &columns)
            }
            ColumnStatsData::Binary(_) => {
                self.aggregate_erased::<Bytes, _>(column_name, partition_names, &columns)
            }
        }?;

        Ok(ColumnStatsObj::new(column_name, data))
    }

    /// Aggregate typed statistics of `column_name`.
    ///
    /// Same as [`aggregate`](Self::aggregate), for callers that already hold
    /// statistics of a known value type.
    pub fn aggregate_typed<T: StatsValue, S: AsRef<str>>(
        &self,
        column_name: &str,
        partition_names: &[S],
        partition_stats: &[PartitionColumnStats<T>],
    ) -> Result<AggregateColumnStats<T>> {
        let entries: Vec<_> = partition_stats
            .iter()
            .map(|p| (p.partition_name.as_str(), &p.stats))
            .collect();
        let stats = self.aggregate_entries(column_name, partition_names, &entries)?;

        Ok(AggregateColumnStats {
            column_name: column_name.to_string(),
            stats,
        })
    }

    fn aggregate_erased<T: StatsValue, S: AsRef<str>>(
        &self,
        column_name: &str,
        partition_names: &[S],
        columns: &[(&str, &ColumnStatsData)],
    ) -> Result<ColumnStatsData> {
        let mut expected = None;
        let mut entries = Vec::with_capacity(columns.len());
        for (partition_name, data) in columns {
            let expected = *expected.get_or_insert(data.type_name());
            let stats = T::from_data(data).context(MismatchedColumnTypeSnafu {
                column_name,
                expected,
                actual: data.type_name(),
            })?;
            entries.push((*partition_name, stats));
        }

        self.aggregate_entries(column_name, partition_names, &entries)
            .map(T::into_data)
    }

    fn aggregate_entries<T: StatsValue, S: AsRef<str>>(
        &self,
        column_name: &str,
        partition_names: &[S],
        entries: &[(&str, &ColumnStats<T>)],
    ) -> Result<ColumnStats<T>> {
        let ordinals = OrdinalIndexMap::new(partition_names);
        let contributions = entries
            .iter()
            .map(|(partition_name, stats)| {
                Ok(Contribution {
                    partition_name: *partition_name,
                    ordinal: ordinals.position(partition_name)?,
                    stats: *stats,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let Some((first, rest)) = contributions.split_first() else {
            return NoStatisticsSnafu { column_name }.fail();
        };

        let num_partitions = ordinals.len();
        let num_partitions_with_stats = contributions.len();
        let all_partitions_have_stats = num_partitions_with_stats == num_partitions;
        debug!(
            column_name,
            num_partitions,
            num_partitions_with_stats,
            all_partitions_have_stats,
            "aggregating column statistics"
        );

        let sketches = self.load_sketches(column_name, &contributions);
        let partition_bounds =
            NdvBounds::from_counts(contributions.iter().map(|c| c.stats.num_distinct))
                .capped::<T>();

        let merge_directly =
            all_partitions_have_stats || num_partitions_with_stats < 2 || !T::EXTRAPOLATES;
        let stats = if merge_directly {
            self.merge_direct(first, rest, sketches.as_deref(), partition_bounds)
        } else {
            let adjusted = match &sketches {
                Some(sketches) => AdjustedPartitions::coalesce_adjacent(&contributions, sketches),
                None => AdjustedPartitions::one_per_partition(&contributions),
            };
            debug!(
                column_name,
                num_units = adjusted.entries.len(),
                units = ?adjusted.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
                "extrapolating column statistics"
            );

            extrapolate(
                &self.config,
                num_partitions,
                num_partitions_with_stats,
                &adjusted,
                partition_bounds,
            )
            .context(NoStatisticsSnafu { column_name })?
        };

        debug!(
            column_name,
            num_nulls = stats.num_nulls,
            num_distinct = stats.num_distinct,
            "aggregated column statistics"
        );
        Ok(stats)
    }

    /// Decode the sketch of every contribution, or none at all.
    ///
    /// A single missing, undecodable or incompatible sketch disables sketch
    /// use for the whole call.
    fn load_sketches<T>(
        &self,
        column_name: &str,
        contributions: &[Contribution<'_, T>],
    ) -> Option<Vec<F::Estimator>> {
        let mut sketches: Vec<F::Estimator> = Vec::with_capacity(contributions.len());
        for c in contributions {
            let Some(bytes) = c.stats.sketch_bytes() else {
                debug!(
                    column_name,
                    partition_name = c.partition_name,
                    "partition has no NDV sketch, not using sketches"
                );
                return None;
            };

            let sketch = match self.estimators.deserialize(bytes) {
                Ok(sketch) => sketch,
                Err(e) => {
                    warn!(
                        column_name,
                        partition_name = c.partition_name,
                        error = %e,
                        "cannot decode NDV sketch, not using sketches"
                    );
                    return None;
                }
            };

            if let Some(first) = sketches.first() {
                if !first.can_merge(&sketch) {
                    debug!(
                        column_name,
                        partition_name = c.partition_name,
                        "NDV sketches cannot be merged, not using sketches"
                    );
                    return None;
                }
            }
            sketches.push(sketch);
        }

        Some(sketches)
    }

    fn merge_direct<T: StatsValue>(
        &self,
        first: &Contribution<'_, T>,
        rest: &[Contribution<'_, T>],
        sketches: Option<&[F::Estimator]>,
        partition_bounds: NdvBounds,
    ) -> ColumnStats<T> {
        let mut acc = StatsAccumulator::new(first.stats);
        for c in rest {
            acc.merge(c.stats);
        }

        match sketches.and_then(SketchAccumulator::merge_all) {
            Some(merged) => {
                let num_distinct = partition_bounds.clamp(merged.estimate());
                let sketch = merged.into_inner().serialize();
                acc.finish(num_distinct, Some(sketch))
            }
            None => {
                let density_range = acc.high_value().distance(acc.low_value());
                let contributions = std::iter::once(first).chain(rest);
                let num_distinct =
                    self.estimate_without_sketches(contributions, density_range, partition_bounds);
                acc.finish(num_distinct, None)
            }
        }
    }

    /// Distinct count from value density, falling back to tuner
    /// interpolation between the bounds.
    fn estimate_without_sketches<'a, 'b: 'a, T: StatsValue>(
        &self,
        contributions: impl Iterator<Item = &'a Contribution<'b, T>>,
        value_range: f64,
        partition_bounds: NdvBounds,
    ) -> u64 {
        if self.config.use_density_function {
            let mut density = DensitySum::default();
            for c in contributions {
                density.add(c.stats);
            }
            if let Some(density) = density.average() {
                return partition_bounds.clamp(estimate_from_density(value_range, density));
            }
            debug!("no usable value density, interpolating NDV bounds");
        }

        let tuned = self
            .config
            .ndv_tuner
            .interpolate(partition_bounds.lower(), partition_bounds.higher());
        partition_bounds.clamp(tuned)
    }
}
