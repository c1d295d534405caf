//! Exact merging of low/high values and null counts.

use bytes::Bytes;
use data_types::ColumnStats;

use crate::value::StatsValue;

/// Statistics of one partition, resolved against the table's partition list.
#[derive(Debug)]
pub(crate) struct Contribution<'a, T> {
    pub(crate) partition_name: &'a str,
    pub(crate) ordinal: usize,
    pub(crate) stats: &'a ColumnStats<T>,
}

/// Running low/high/null merge.
///
/// On ties the value already held wins, so the first contributor keeps its
/// low and high value.
#[derive(Debug)]
pub(crate) struct StatsAccumulator<T> {
    low_value: T,
    high_value: T,
    num_nulls: u64,
}

impl<T: StatsValue> StatsAccumulator<T> {
    pub(crate) fn new(first: &ColumnStats<T>) -> Self {
        Self {
            low_value: first.low_value.clone(),
            high_value: first.high_value.clone(),
            num_nulls: first.num_nulls,
        }
    }

    pub(crate) fn merge(&mut self, other: &ColumnStats<T>) {
        self.low_value = T::min(&self.low_value, &other.low_value).clone();
        self.high_value = T::max(&self.high_value, &other.high_value).clone();
        self.num_nulls = self.num_nulls.saturating_add(other.num_nulls);
    }

    pub(crate) fn low_value(&self) -> &T {
        &self.low_value
    }

    pub(crate) fn high_value(&self) -> &T {
        &self.high_value
    }

    pub(crate) fn finish(self, num_distinct: u64, sketch: Option<Bytes>) -> ColumnStats<T> {
        ColumnStats {
            low_value: self.low_value,
            high_value: self.high_value,
            num_nulls: self.num_nulls,
            num_distinct,
            sketch,
        }
    }
}
