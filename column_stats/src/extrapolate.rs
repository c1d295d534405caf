//! Extrapolation of partial statistics to the whole table.
//!
//! Each adjusted partition is a point `(ordinal, value)`. Extrapolation finds
//! the units holding the smallest and largest value, draws a line through
//! them and projects it out to the border it trends toward: ordinal `0` on
//! the left and the table's partition count on the right.

use std::cmp::Ordering;

use data_types::ColumnStats;

use crate::{
    coalesce::{AdjustedPartition, AdjustedPartitions},
    config::AggregatorConfig,
    ndv::{estimate_from_density, NdvBounds},
    value::StatsValue,
};

/// Extrapolate to `num_partitions` partitions, of which
/// `num_partitions_with_stats` contributed.
///
/// `partition_bounds` are the distinct-count bounds over the contributing
/// partitions. Returns `None` if there is nothing to extrapolate from.
pub(crate) fn extrapolate<T: StatsValue>(
    config: &AggregatorConfig,
    num_partitions: usize,
    num_partitions_with_stats: usize,
    adjusted: &AdjustedPartitions<T>,
    partition_bounds: NdvBounds,
) -> Option<ColumnStats<T>> {
    let entries = &adjusted.entries;
    let right_border = num_partitions as f64;

    let (min, max) = extremes(entries, |a, b| a.low_value.compare(&b.low_value))?;
    let low_value = project_low(
        min.index,
        &min.stats.low_value,
        max.index,
        &max.stats.low_value,
        right_border,
    );

    let (min, max) = extremes(entries, |a, b| a.high_value.compare(&b.high_value))?;
    let high_value = project_high(
        min.index,
        &min.stats.high_value,
        max.index,
        &max.stats.high_value,
        right_border,
    );

    let total_nulls = entries.iter().map(|e| u128::from(e.stats.num_nulls)).sum();
    let num_nulls = scale_nulls(total_nulls, num_partitions, num_partitions_with_stats);

    let density = adjusted
        .density
        .average()
        .filter(|_| config.use_density_function);
    let num_distinct = match density {
        Some(density) => {
            let group_bounds =
                NdvBounds::from_counts(entries.iter().map(|e| e.stats.num_distinct));
            group_bounds.clamp(estimate_from_density(
                high_value.distance(&low_value),
                density,
            ))
        }
        None => {
            let (min, max) = extremes(entries, |a, b| a.num_distinct.cmp(&b.num_distinct))?;
            project_high(
                min.index,
                &(min.stats.num_distinct as f64),
                max.index,
                &(max.stats.num_distinct as f64),
                right_border,
            ) as u64
        }
    };

    Some(ColumnStats {
        low_value,
        high_value,
        num_nulls,
        num_distinct: partition_bounds.clamp(num_distinct),
        sketch: None,
    })
}

/// The first and last unit after a stable sort by `cmp`.
fn extremes<'a, T>(
    entries: &'a [AdjustedPartition<T>],
    cmp: impl Fn(&ColumnStats<T>, &ColumnStats<T>) -> Ordering,
) -> Option<(&'a AdjustedPartition<T>, &'a AdjustedPartition<T>)> {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| cmp(&a.stats, &b.stats));
    Some((sorted.first().copied()?, sorted.last().copied()?))
}

/// Project the smallest value toward the border away from the largest one.
fn project_low<V: StatsValue>(
    min_index: f64,
    min_value: &V,
    max_index: f64,
    max_value: &V,
    right_border: f64,
) -> V {
    match min_index.total_cmp(&max_index) {
        Ordering::Equal => min_value.clone(),
        Ordering::Less => V::project(max_value, min_value, max_index, max_index - min_index),
        Ordering::Greater => V::project(
            max_value,
            min_value,
            right_border - max_index,
            min_index - max_index,
        ),
    }
}

/// Project the largest value toward the border away from the smallest one.
///
/// Degenerates to the smallest value if both sit at the same position.
fn project_high<V: StatsValue>(
    min_index: f64,
    min_value: &V,
    max_index: f64,
    max_value: &V,
    right_border: f64,
) -> V {
    match min_index.total_cmp(&max_index) {
        Ordering::Equal => min_value.clone(),
        Ordering::Less => V::project(
            min_value,
            max_value,
            right_border - min_index,
            max_index - min_index,
        ),
        Ordering::Greater => V::project(min_value, max_value, min_index, min_index - max_index),
    }
}

/// Scale the observed null count by `num_partitions / num_partitions_with_stats`,
/// rounding half up.
fn scale_nulls(total: u128, num_partitions: usize, num_partitions_with_stats: usize) -> u64 {
    let with_stats = num_partitions_with_stats as u128;
    let scaled = if with_stats == 0 {
        total
    } else {
        total
            .saturating_mul(num_partitions as u128)
            .saturating_add(with_stats / 2)
            / with_stats
    };
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ndv::DensitySum;
    use proptest::prelude::*;

    fn adjusted(entries: Vec<(f64, ColumnStats<i64>)>) -> AdjustedPartitions<i64> {
        let mut density = DensitySum::default();
        let entries = entries
            .into_iter()
            .map(|(index, stats)| {
                density.add(&stats);
                AdjustedPartition {
                    name: format!("p{index}"),
                    index,
                    stats,
                }
            })
            .collect();
        AdjustedPartitions { entries, density }
    }

    fn trailing_partitions() -> AdjustedPartitions<i64> {
        adjusted(vec![
            (6.0, ColumnStats::new(10, 20, 1, 5)),
            (7.0, ColumnStats::new(12, 22, 1, 5)),
            (8.0, ColumnStats::new(14, 24, 1, 5)),
            (9.0, ColumnStats::new(16, 26, 1, 5)),
        ])
    }

    #[test]
    fn extrapolates_along_the_trend() {
        let adjusted = trailing_partitions();
        let bounds = NdvBounds::from_counts([5, 5, 5, 5]);
        let config = AggregatorConfig::default().with_density_function(true);

        let stats = extrapolate(&config, 10, 4, &adjusted, bounds).unwrap();

        // 20 + (26 - 20) * (10 - 6) / (9 - 6)
        assert_eq!(stats.high_value, 28);
        // 16 - (16 - 10) * 9 / (9 - 6)
        assert_eq!(stats.low_value, -2);
        assert_eq!(stats.num_nulls, 10);
        // (28 - -2) / 2
        assert_eq!(stats.num_distinct, 15);
        assert_eq!(stats.sketch, None);
    }

    #[test]
    fn decreasing_trend_projects_toward_the_right() {
        let adjusted = adjusted(vec![
            (0.0, ColumnStats::new(30, 40, 0, 5)),
            (1.0, ColumnStats::new(20, 30, 0, 5)),
        ]);
        let bounds = NdvBounds::from_counts([5, 5]);

        let stats = extrapolate(&AggregatorConfig::default(), 4, 2, &adjusted, bounds).unwrap();

        // 30 - (30 - 20) * (4 - 0) / (1 - 0)
        assert_eq!(stats.low_value, -10);
        // 30 + (40 - 30) * 1 / (1 - 0)
        assert_eq!(stats.high_value, 40);
        assert_eq!(stats.num_distinct, 5);
    }

    #[test]
    fn ndv_without_density_follows_the_largest_count() {
        let adjusted = adjusted(vec![
            (1.0, ColumnStats::new(0, 10, 0, 4)),
            (2.0, ColumnStats::new(0, 10, 0, 6)),
        ]);
        let bounds = NdvBounds::from_counts([4, 6]);
        let stats = extrapolate(&AggregatorConfig::default(), 4, 2, &adjusted, bounds).unwrap();

        // 4 + (6 - 4) * (4 - 1) / (2 - 1) = 10 is the sum of both counts
        assert_eq!(stats.num_distinct, 10);
    }

    #[test]
    fn ndv_is_clamped_into_partition_bounds() {
        let adjusted = adjusted(vec![
            (0.0, ColumnStats::new(0, 10, 0, 1)),
            (1.0, ColumnStats::new(0, 10, 0, 9)),
        ]);
        let bounds = NdvBounds::from_counts([1, 9]);

        let stats = extrapolate(&AggregatorConfig::default(), 100, 2, &adjusted, bounds).unwrap();
        assert_eq!(stats.num_distinct, 10);
    }

    #[test]
    fn single_position_degenerates_to_observed_values() {
        let adjusted = adjusted(vec![(3.0, ColumnStats::new(5, 9, 2, 3))]);
        let bounds = NdvBounds::from_counts([3]);

        let stats = extrapolate(&AggregatorConfig::default(), 10, 1, &adjusted, bounds).unwrap();

        assert_eq!(stats.low_value, 5);
        assert_eq!(stats.high_value, 9);
        assert_eq!(stats.num_nulls, 20);
        assert_eq!(stats.num_distinct, 3);
    }

    #[test]
    fn nothing_to_extrapolate() {
        let adjusted = adjusted(vec![]);
        let stats = extrapolate(
            &AggregatorConfig::default(),
            10,
            0,
            &adjusted,
            NdvBounds::default(),
        );
        assert!(stats.is_none());
    }

    #[test]
    fn null_scaling_rounds_half_up() {
        assert_eq!(scale_nulls(1, 3, 2), 2);
        assert_eq!(scale_nulls(1, 5, 3), 2);
        assert_eq!(scale_nulls(1, 4, 3), 1);
        assert_eq!(scale_nulls(7, 4, 4), 7);
        assert_eq!(scale_nulls(7, 4, 0), 7);
        assert_eq!(scale_nulls(u128::from(u64::MAX), 10, 1), u64::MAX);
    }

    proptest! {
        #[test]
        fn null_scaling_never_shrinks(
            total in 0_u64..1_000_000_000,
            with_stats in 1_usize..1_000,
            extra in 0_usize..1_000,
        ) {
            let scaled = scale_nulls(u128::from(total), with_stats + extra, with_stats);
            prop_assert!(scaled >= total);
        }

        #[test]
        fn null_scaling_grows_with_partition_count(
            total in 0_u64..1_000_000_000,
            with_stats in 1_usize..1_000,
            num_partitions in 1_usize..10_000,
        ) {
            let fewer = scale_nulls(u128::from(total), num_partitions, with_stats);
            let more = scale_nulls(u128::from(total), num_partitions + 1, with_stats);
            prop_assert!(fewer <= more);
        }
    }
}
