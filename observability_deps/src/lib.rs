//! This crate exists to coordinate versions of `tracing` so that every
//! crate in the workspace logs through the same version and feature set.
//!
//! Import the macros through this crate:
//!
//! ```
//! use observability_deps::tracing::debug;
//!
//! debug!(column_name = "time", "aggregating column statistics");
//! ```

pub use tracing;
