//! Distinct-count bounds and density helpers.

use data_types::ColumnStats;

use crate::value::StatsValue;

/// The range a combined distinct count must fall into.
///
/// The lower bound assumes every partition holds the same values (largest
/// single count); the upper bound assumes they are disjoint (sum of counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct NdvBounds {
    lower: u64,
    higher: u64,
}

impl NdvBounds {
    pub(crate) fn from_counts(counts: impl IntoIterator<Item = u64>) -> Self {
        counts
            .into_iter()
            .fold(Self::default(), |bounds, count| bounds.add(count))
    }

    pub(crate) fn add(self, count: u64) -> Self {
        Self {
            lower: self.lower.max(count),
            higher: self.higher.saturating_add(count),
        }
    }

    /// Apply the type's distinct-value cap, never going below the lower bound.
    pub(crate) fn capped<T: StatsValue>(self) -> Self {
        match T::MAX_DISTINCT {
            Some(cap) => Self {
                higher: self.higher.min(cap).max(self.lower),
                ..self
            },
            None => self,
        }
    }

    pub(crate) fn lower(&self) -> u64 {
        self.lower
    }

    pub(crate) fn higher(&self) -> u64 {
        self.higher
    }

    pub(crate) fn clamp(&self, estimate: u64) -> u64 {
        estimate.clamp(self.lower, self.higher)
    }
}

/// Sum of per-unit value densities (`distance(high, low) / num_distinct`).
///
/// Units without distinct values have no defined density and are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DensitySum {
    sum: f64,
    count: usize,
}

impl DensitySum {
    pub(crate) fn add<T: StatsValue>(&mut self, stats: &ColumnStats<T>) {
        if stats.num_distinct == 0 {
            return;
        }
        self.sum += stats.high_value.distance(&stats.low_value) / stats.num_distinct as f64;
        self.count += 1;
    }

    /// Mean density, if it is usable as a divisor.
    pub(crate) fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let average = self.sum / self.count as f64;
        (average.is_finite() && average > 0.0).then_some(average)
    }
}

/// Distinct values expected in a value range of the given width.
pub(crate) fn estimate_from_density(range: f64, density: f64) -> u64 {
    (range / density) as u64
}
