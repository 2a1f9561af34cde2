//! Query-time segment routing.
//!
//! A [`SegmentRouter`] turns a query's partition-column predicate and the
//! table's segment list into a [`RoutingTable`]:
//!
//! 1. [`PartitionPruner`] evaluates the predicate with the same partition
//!    contract the ingestion side used and drops segments whose partition
//!    cannot match. Dropped segments are irrelevant, not missing, and never
//!    appear in the table.
//! 2. A [`ReplicaSelector`] picks one healthy server per remaining segment.
//!    Segments without one are recorded as unavailable.
//! 3. [`RoutingTableBuilder`] enforces that each segment lands in exactly one
//!    place.

mod error;
mod pruner;
mod selector;
mod table;

pub use error::RoutingError;
pub use pruner::{PartitionPredicate, PartitionPruner, SegmentDescriptor, SegmentPartition};
pub use selector::{ReplicaAssignment, ReplicaSelector};
pub use table::{RoutingTable, RoutingTableBuilder, ServerInstance};

use crate::observability::{log_debug, log_warn};

/// Builds per-query routing tables from a pruner and a replica selector.
#[derive(Clone, Debug)]
pub struct SegmentRouter<S> {
    pruner: PartitionPruner,
    selector: S,
}

impl<S> SegmentRouter<S>
where
    S: ReplicaSelector,
{
    /// Combine a pruner with a replica selection policy.
    pub fn new(pruner: PartitionPruner, selector: S) -> Self {
        Self { pruner, selector }
    }

    /// Partition pruner in use.
    pub fn pruner(&self) -> &PartitionPruner {
        &self.pruner
    }

    /// Replica selector in use.
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Route `segments` for a query constrained by `predicate`.
    ///
    /// `predicate == None` means the query places no constraint on the
    /// partition column, so every segment is a candidate. Fails only if the
    /// same segment name is listed twice.
    pub fn route<'s, I>(
        &self,
        segments: I,
        predicate: Option<&PartitionPredicate>,
    ) -> Result<RoutingTable, RoutingError>
    where
        I: IntoIterator<Item = &'s SegmentDescriptor>,
    {
        let mut total = 0usize;
        let listed = segments.into_iter().inspect(|_| total += 1);
        let candidates = self.pruner.prune(listed, predicate);
        log_debug!(
            component = "routing",
            event = "segments_pruned",
            column = %self.pruner.column(),
            total,
            candidates = candidates.len(),
        );

        let mut builder = RoutingTableBuilder::new();
        for segment in candidates {
            match self.selector.select(segment.name()) {
                Some(server) => builder.add_segment(server, segment.name())?,
                None => builder.add_unavailable(segment.name())?,
            };
        }
        let table = builder.build();

        if !table.unavailable_segments().is_empty() {
            log_warn!(
                component = "routing",
                event = "segments_unavailable",
                count = table.unavailable_segments().len(),
                segments = ?table.unavailable_segments(),
            );
        }
        log_debug!(
            component = "routing",
            event = "routing_table_built",
            servers = table.server_to_segments().len(),
            served = table.num_served_segments(),
            unavailable = table.unavailable_segments().len(),
        );
        Ok(table)
    }
}
