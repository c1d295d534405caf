//! Types having to do with per-column statistics.

use bytes::Bytes;

use crate::value::{Date, Decimal, Timestamp};

/// Column statistics for a single column over some set of rows.
///
/// `low_value <= high_value` is expected to hold on every instance produced
/// by statistics collection; it is not re-validated by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats<T> {
    /// Smallest non-null value.
    pub low_value: T,
    /// Largest non-null value.
    pub high_value: T,
    /// Number of NULL values.
    pub num_nulls: u64,
    /// Number of distinct non-null values.
    pub num_distinct: u64,
    /// Serialized distinct-value estimator state, if one was collected.
    pub sketch: Option<Bytes>,
}

impl<T> ColumnStats<T> {
    /// Create statistics without an estimator sketch.
    pub fn new(low_value: T, high_value: T, num_nulls: u64, num_distinct: u64) -> Self {
        Self {
            low_value,
            high_value,
            num_nulls,
            num_distinct,
            sketch: None,
        }
    }

    /// Attach serialized estimator state.
    pub fn with_sketch(self, sketch: impl Into<Bytes>) -> Self {
        Self {
            sketch: Some(sketch.into()),
            ..self
        }
    }

    /// Returns the sketch bytes, treating an empty payload as absent.
    pub fn sketch_bytes(&self) -> Option<&[u8]> {
        self.sketch
            .as_deref()
            .filter(|sketch| !sketch.is_empty())
    }
}

/// Statistics of one column in one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionColumnStats<T> {
    /// Name of the partition these statistics were collected for.
    pub partition_name: String,
    /// The statistics.
    pub stats: ColumnStats<T>,
}

impl<T> PartitionColumnStats<T> {
    /// Create a new [`PartitionColumnStats`].
    pub fn new(partition_name: impl Into<String>, stats: ColumnStats<T>) -> Self {
        Self {
            partition_name: partition_name.into(),
            stats,
        }
    }
}

/// Statistics of one column combined across several partitions.
///
/// This is always an estimate, even if every partition contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateColumnStats<T> {
    /// Column the statistics belong to.
    pub column_name: String,
    /// The combined statistics.
    pub stats: ColumnStats<T>,
}

/// Column statistics for any of the supported column types.
#[derive(Debug, Clone, PartialEq)]
#[expect(missing_docs)]
pub enum ColumnStatsData {
    Boolean(ColumnStats<bool>),
    Long(ColumnStats<i64>),
    Double(ColumnStats<f64>),
    Decimal(ColumnStats<Decimal>),
    Date(ColumnStats<Date>),
    Timestamp(ColumnStats<Timestamp>),
    String(ColumnStats<String>),
    Binary(ColumnStats<Bytes>),
}

impl ColumnStatsData {
    /// Name of the column type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
        }
    }

    /// Number of NULL values, regardless of column type.
    pub fn num_nulls(&self) -> u64 {
        match self {
            Self::Boolean(s) => s.num_nulls,
            Self::Long(s) => s.num_nulls,
            Self::Double(s) => s.num_nulls,
            Self::Decimal(s) => s.num_nulls,
            Self::Date(s) => s.num_nulls,
            Self::Timestamp(s) => s.num_nulls,
            Self::String(s) => s.num_nulls,
            Self::Binary(s) => s.num_nulls,
        }
    }

    /// Number of distinct values, regardless of column type.
    pub fn num_distinct(&self) -> u64 {
        match self {
            Self::Boolean(s) => s.num_distinct,
            Self::Long(s) => s.num_distinct,
            Self::Double(s) => s.num_distinct,
            Self::Decimal(s) => s.num_distinct,
            Self::Date(s) => s.num_distinct,
            Self::Timestamp(s) => s.num_distinct,
            Self::String(s) => s.num_distinct,
            Self::Binary(s) => s.num_distinct,
        }
    }
}

/// Statistics of a single named column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatsObj {
    /// Column name.
    pub column_name: String,
    /// Typed statistics.
    pub data: ColumnStatsData,
}

impl ColumnStatsObj {
    /// Create a new [`ColumnStatsObj`].
    pub fn new(column_name: impl Into<String>, data: ColumnStatsData) -> Self {
        Self {
            column_name: column_name.into(),
            data,
        }
    }
}

/// The statistics record stored for one partition.
///
/// When requested for a single column this carries exactly one
/// [`ColumnStatsObj`]; any other count indicates a malformed catalog read.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionStatistics {
    /// Name of the partition.
    pub partition_name: String,
    /// Per-column statistics.
    pub column_stats: Vec<ColumnStatsObj>,
}

impl PartitionStatistics {
    /// Create a record carrying a single column.
    pub fn new(partition_name: impl Into<String>, column_stats: ColumnStatsObj) -> Self {
        Self {
            partition_name: partition_name.into(),
            column_stats: vec![column_stats],
        }
    }
}
