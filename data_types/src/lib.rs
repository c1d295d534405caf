//! Shared data types for column statistics.
//!
//! These are plain records exchanged between the catalog, the statistics
//! aggregation engine and the query planner. They carry no behaviour beyond
//! construction and conversion.
#![warn(missing_docs)]

pub mod column_stats;
pub use column_stats::*;

pub mod value;
pub use value::*;
