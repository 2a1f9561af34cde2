//! Log events for partition assignment and segment routing.
//!
//! Every event is a `tracing` event under the `partition_routing` target with
//! two fixed fields: `component` (`partitioner` or `routing`) and `event`,
//! a snake_case name that stays stable across releases so operators can
//! alert on it. Remaining fields describe the column, spec or segments
//! involved. Setup and routing summaries are emitted at info/debug; the
//! per-record `record_partitioned` event is debug only. Installing a
//! subscriber is left to the embedding job.

/// `tracing` target shared by every event below.
pub(crate) const TARGET: &str = "partition_routing";

/// Info event, e.g. `log_info!(component = "partitioner", event = "...", ordinal)`.
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::TARGET, $($field)*)
    };
}

/// Debug event; used for per-query and per-record detail.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::TARGET, $($field)*)
    };
}

/// Warn event; routing uses it for required segments nobody can serve.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::TARGET, $($field)*)
    };
}

/// Error event, emitted right before a record-level failure is returned.
macro_rules! log_error {
    ($($field:tt)*) => {
        ::tracing::error!(target: $crate::observability::TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_error;
pub(crate) use log_info;
pub(crate) use log_warn;
