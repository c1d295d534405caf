//! Units of extrapolation.
//!
//! Extrapolation works on "adjusted" partitions: either one unit per
//! contributing partition, or, when every partition carries a mergeable
//! sketch, one pseudo-partition per run of ordinally adjacent partitions.
//! A pseudo-partition sits at the mean ordinal of its members and its
//! distinct count comes from the members' merged sketch.

use data_types::ColumnStats;

use crate::{
    merge::{Contribution, StatsAccumulator},
    ndv::{DensitySum, NdvBounds},
    sketch::{NdvEstimator, SketchAccumulator},
    value::StatsValue,
};

/// One unit of extrapolation.
#[derive(Debug)]
pub(crate) struct AdjustedPartition<T> {
    /// Partition name, or the concatenated member names of a run.
    pub(crate) name: String,
    /// Ordinal position; the mean member position for a run.
    pub(crate) index: f64,
    pub(crate) stats: ColumnStats<T>,
}

/// Adjusted partitions in ordinal order, plus their density sum.
#[derive(Debug)]
pub(crate) struct AdjustedPartitions<T> {
    pub(crate) entries: Vec<AdjustedPartition<T>>,
    pub(crate) density: DensitySum,
}

impl<T: StatsValue> AdjustedPartitions<T> {
    /// Every contribution becomes its own unit.
    pub(crate) fn one_per_partition(contributions: &[Contribution<'_, T>]) -> Self {
        let mut adjusted = Self::with_capacity(contributions.len());
        for c in sorted_by_ordinal(contributions) {
            adjusted.push(AdjustedPartition {
                name: c.partition_name.to_string(),
                index: c.ordinal as f64,
                stats: without_sketch(c.stats),
            });
        }
        adjusted
    }

    /// Merge runs of ordinally adjacent contributions into pseudo-partitions.
    ///
    /// `sketches[i]` must be the decoded sketch of `contributions[i]`, and
    /// all sketches must be mergeable with each other.
    pub(crate) fn coalesce_adjacent<E: NdvEstimator>(
        contributions: &[Contribution<'_, T>],
        sketches: &[E],
    ) -> Self {
        debug_assert_eq!(contributions.len(), sketches.len());

        let mut order: Vec<_> = contributions.iter().zip(sketches).collect();
        order.sort_by_key(|(c, _)| c.ordinal);

        let mut adjusted = Self::with_capacity(contributions.len());
        let mut run: Option<Run<T, E>> = None;
        for (c, sketch) in order {
            if let Some(r) = run.as_mut().filter(|r| r.next_ordinal == c.ordinal) {
                r.push(c, sketch);
                continue;
            }
            if let Some(r) = run.take() {
                adjusted.push(r.finish());
            }
            run = Some(Run::start(c, sketch));
        }
        if let Some(r) = run {
            adjusted.push(r.finish());
        }

        adjusted
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            density: DensitySum::default(),
        }
    }

    fn push(&mut self, entry: AdjustedPartition<T>) {
        self.density.add(&entry.stats);
        self.entries.push(entry);
    }
}

fn sorted_by_ordinal<'a, 'b, T>(
    contributions: &'b [Contribution<'a, T>],
) -> Vec<&'b Contribution<'a, T>> {
    let mut sorted: Vec<_> = contributions.iter().collect();
    sorted.sort_by_key(|c| c.ordinal);
    sorted
}

fn without_sketch<T: Clone>(stats: &ColumnStats<T>) -> ColumnStats<T> {
    ColumnStats {
        sketch: None,
        ..stats.clone()
    }
}

/// A run of ordinally adjacent contributions being folded together.
#[derive(Debug)]
struct Run<T, E> {
    name: String,
    ordinal_sum: u128,
    len: usize,
    next_ordinal: usize,
    stats: StatsAccumulator<T>,
    sketch: SketchAccumulator<E>,
    bounds: NdvBounds,
}

impl<T: StatsValue, E: NdvEstimator> Run<T, E> {
    fn start(c: &Contribution<'_, T>, sketch: &E) -> Self {
        let mut acc = SketchAccumulator::new_like(sketch);
        acc.merge(sketch);

        Self {
            name: c.partition_name.to_string(),
            ordinal_sum: c.ordinal as u128,
            len: 1,
            next_ordinal: c.ordinal + 1,
            stats: StatsAccumulator::new(c.stats),
            sketch: acc,
            bounds: NdvBounds::default().add(c.stats.num_distinct),
        }
    }

    fn push(&mut self, c: &Contribution<'_, T>, sketch: &E) {
        self.name.push_str(c.partition_name);
        self.ordinal_sum += c.ordinal as u128;
        self.len += 1;
        self.next_ordinal = c.ordinal + 1;
        self.stats.merge(c.stats);
        self.sketch.merge(sketch);
        self.bounds = self.bounds.add(c.stats.num_distinct);
    }

    fn finish(self) -> AdjustedPartition<T> {
        let num_distinct = self.bounds.clamp(self.sketch.estimate());
        AdjustedPartition {
            name: self.name,
            index: self.ordinal_sum as f64 / self.len as f64,
            stats: self.stats.finish(num_distinct, None),
        }
    }
}
