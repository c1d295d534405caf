//! Utilities shared by the tests of the workspace crates.
#![warn(missing_docs)]

use std::sync::Once;

use observability_deps::tracing::subscriber;
use tracing_subscriber::{fmt, EnvFilter};

pub mod tracing;

/// Asserts that `$ACTUAL` contains `$EXPECTED`, both rendered as strings.
#[macro_export]
macro_rules! assert_contains {
    ($ACTUAL: expr, $EXPECTED: expr) => {
        let actual_value: String = $ACTUAL.to_string();
        let expected_value: String = $EXPECTED.to_string();
        assert!(
            actual_value.contains(&expected_value),
            "Can not find expected in actual.\n\nExpected:\n{}\n\nActual:\n{}",
            expected_value,
            actual_value
        );
    };
}

/// Asserts that `$OPERATION` failed with an error matching the pattern.
#[macro_export]
macro_rules! assert_error {
    ($OPERATION: expr, $(|)? $( $ERROR_TYPE:pat_param )|+ $( if $GUARD: expr )? $(,)?) => {
        let err = $OPERATION.unwrap_err();
        assert!(
            matches!(err, $( $ERROR_TYPE )|+ $( if $GUARD )?),
            "Expected {}, but got {:?}",
            stringify!($( $ERROR_TYPE )|+ $( if $GUARD )?),
            err
        );
    };
}

static LOG_SETUP: Once = Once::new();

/// Enables logging for tests if `RUST_LOG` is set.
///
/// Run with `RUST_LOG=debug cargo test` to see what the aggregator decided
/// for each column.
pub fn maybe_start_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        start_logging()
    }
}

/// Enables logging for tests, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call any number of times; only the first call installs the
/// subscriber.
pub fn start_logging() {
    LOG_SETUP.call_once(|| {
        // forward `log` records of dependencies
        tracing_log::LogTracer::init().ok();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        subscriber::set_global_default(subscriber).ok();
    })
}
