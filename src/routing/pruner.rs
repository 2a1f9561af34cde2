use std::{collections::BTreeSet, num::NonZeroU32};

use serde::{Deserialize, Serialize};

use crate::{
    canonical::PartitionValue,
    partition::{PartitionFunction, PartitionId, PartitionSpec},
};

/// Partition tag written by segment generation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentPartition {
    /// Function the segment's records were partitioned with.
    pub function: PartitionFunction,
    /// Partition count used at ingestion.
    pub num_partitions: NonZeroU32,
    /// Text null values were partitioned as at ingestion.
    pub default_null_value: String,
    /// Partition the segment was built from.
    pub id: PartitionId,
}

impl SegmentPartition {
    /// Tag for partition `id` under `spec`.
    pub fn new(spec: &PartitionSpec, id: PartitionId) -> Self {
        Self {
            function: spec.function(),
            num_partitions: spec.num_partitions(),
            default_null_value: spec.default_null_value().to_string(),
            id,
        }
    }
}

/// A segment as seen by the router: its name and optional partition tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    name: String,
    partition: Option<SegmentPartition>,
}

impl SegmentDescriptor {
    /// Segment without partition metadata; never pruned by partition.
    pub fn untagged(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition: None,
        }
    }

    /// Segment built from a single partition.
    pub fn tagged(name: impl Into<String>, partition: SegmentPartition) -> Self {
        Self {
            name: name.into(),
            partition: Some(partition),
        }
    }

    /// Segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partition tag, if recorded.
    pub fn partition(&self) -> Option<&SegmentPartition> {
        self.partition.as_ref()
    }
}

/// Query constraint on the partition column that allows pruning.
#[derive(Clone, Debug, PartialEq)]
pub enum PartitionPredicate {
    /// `column = value`.
    Eq(PartitionValue<'static>),
    /// `column IN (values...)`.
    In(Vec<PartitionValue<'static>>),
    /// `column IS NULL`.
    IsNull,
}

/// Selects candidate segments by evaluating predicates with the table's
/// partition contract.
#[derive(Clone, Debug)]
pub struct PartitionPruner {
    column: String,
    spec: PartitionSpec,
}

impl PartitionPruner {
    /// Pruner for `column` partitioned under `spec`.
    pub fn new(column: impl Into<String>, spec: PartitionSpec) -> Self {
        Self {
            column: column.into(),
            spec,
        }
    }

    /// Partition column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Partition contract.
    pub fn spec(&self) -> &PartitionSpec {
        &self.spec
    }

    /// Partitions that can hold rows matching `predicate`.
    ///
    /// Values are canonicalized exactly as the ingestion side does, so a null
    /// comparison resolves to the default-null value's partition.
    pub fn matching_partitions(&self, predicate: &PartitionPredicate) -> BTreeSet<PartitionId> {
        let canonicalizer = self.spec.canonicalizer();
        let partition_of = |value: &PartitionValue<'_>| {
            let key = canonicalizer.canonicalize(value);
            self.spec.partition_of_key(&key)
        };
        match predicate {
            PartitionPredicate::Eq(value) => BTreeSet::from([partition_of(value)]),
            PartitionPredicate::In(values) => values.iter().map(partition_of).collect(),
            PartitionPredicate::IsNull => BTreeSet::from([partition_of(&PartitionValue::Null)]),
        }
    }

    /// Whether `segment` may contain matching rows.
    ///
    /// `matching == None` means the query does not constrain the partition
    /// column. Untagged segments, and segments tagged under a different
    /// function, partition count or default-null value, cannot be pruned and
    /// are always kept.
    pub fn is_candidate(
        &self,
        segment: &SegmentDescriptor,
        matching: Option<&BTreeSet<PartitionId>>,
    ) -> bool {
        let (Some(matching), Some(tag)) = (matching, segment.partition()) else {
            return true;
        };
        if tag.function != self.spec.function()
            || tag.num_partitions != self.spec.num_partitions()
            || tag.default_null_value != self.spec.default_null_value()
        {
            return true;
        }
        matching.contains(&tag.id)
    }

    /// Candidate segments for `predicate`, in input order.
    pub fn prune<'s, I>(
        &self,
        segments: I,
        predicate: Option<&PartitionPredicate>,
    ) -> Vec<&'s SegmentDescriptor>
    where
        I: IntoIterator<Item = &'s SegmentDescriptor>,
    {
        let matching = predicate.map(|p| self.matching_partitions(p));
        segments
            .into_iter()
            .filter(|segment| self.is_candidate(segment, matching.as_ref()))
            .collect()
    }
}
