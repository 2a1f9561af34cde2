#![deny(missing_docs)]
//! Partition contract shared by ingestion-time partitioning and query-time
//! segment routing.
//!
//! Data is split at ingestion into disjoint partitions, each becoming one or
//! more immutable segments. At query time the router must ask exactly the
//! right servers for exactly the right segments. Both steps run in different
//! processes at different times, and the only thing keeping them consistent is
//! the [`partition::PartitionSpec`]: the same canonical text for a value and
//! the same partition function must be used on both sides, or rows silently
//! go missing from query results.
//!
//! - [`canonical`] renders column values into [`canonical::CanonicalKey`]s.
//! - [`partition`] maps keys onto [`partition::PartitionId`]s.
//! - [`partitioner`] assigns ingestion records (Arrow rows) to partitions.
//! - [`routing`] prunes segments by partition and builds the per-query
//!   [`routing::RoutingTable`].
//! - [`config`] interprets the partitioner's property map.

mod observability;

/// Canonical text form of partition column values.
pub mod canonical;

/// Partitioner configuration keys and validation.
pub mod config;

/// Partition functions, partition specs, and their errors.
pub mod partition;

/// Per-record partition assignment during ingestion.
pub mod partitioner;

/// Segment pruning and routing tables.
pub mod routing;

pub use crate::{
    canonical::{CanonicalKey, Canonicalizer, PartitionValue},
    config::{PartitionerConfig, PartitioningMode},
    partition::{
        ConfigurationError, ConversionError, PartitionError, PartitionFunction, PartitionId,
        PartitionSpec,
    },
    partitioner::RecordPartitioner,
    routing::{RoutingError, RoutingTable, SegmentRouter, ServerInstance},
};
