use snafu::Snafu;

/// Column statistics aggregation errors.
///
/// These are all caused by malformed input; loss of estimation precision
/// (missing or incompatible sketches, ...) is never an error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[expect(missing_docs)]
pub enum Error {
    #[snafu(display(
        "The number of columns should be exactly one in aggregated statistics, but found {partition_count}"
    ))]
    MalformedStats { partition_count: usize },

    #[snafu(display(
        "Partition '{partition_name}' has statistics but is not one of the table's partitions"
    ))]
    MissingPartition { partition_name: String },

    #[snafu(display(
        "Column '{column_name}' mixes statistics types: expected {expected}, found {actual}"
    ))]
    MismatchedColumnType {
        column_name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[snafu(display("No partition statistics to aggregate for column '{column_name}'"))]
    NoStatistics { column_name: String },
}

/// Result type of the aggregator.
pub type Result<T, E = Error> = std::result::Result<T, E>;
