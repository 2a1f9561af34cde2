//! Per-record partition assignment during ingestion.
//!
//! Each ingestion task owns one [`RecordPartitioner`]. With a partition column
//! configured, every record is routed by the table's [`PartitionSpec`] so that
//! query-time pruning can later find it; without one, records are spread
//! round-robin over the output shards as a load-balancing hint only.

use std::num::NonZeroU32;

use arrow::{record_batch::RecordBatch, util::display::array_value_to_string};

use crate::{
    config::{PartitionerConfig, PartitioningMode},
    observability::{log_debug, log_error, log_info},
    partition::{ConfigurationError, ConversionError, PartitionError, PartitionId, PartitionSpec},
};

/// Assigns ingestion records to partitions.
///
/// Instances are task-local: the ordinal cache and round-robin counter are
/// plain fields and are never shared across tasks.
#[derive(Debug)]
pub struct RecordPartitioner {
    strategy: Strategy,
}

#[derive(Debug)]
enum Strategy {
    Column(ColumnPartitioner),
    RoundRobin(RoundRobin),
}

#[derive(Debug)]
struct ColumnPartitioner {
    column: String,
    spec: PartitionSpec,
    ordinal: Option<usize>,
}

#[derive(Debug)]
struct RoundRobin {
    reducers: NonZeroU32,
    counter: u64,
}

impl RecordPartitioner {
    /// Build a partitioner from validated configuration.
    pub fn new(config: &PartitionerConfig) -> Self {
        let strategy = match config.mode() {
            PartitioningMode::Column { column, spec } => {
                log_info!(
                    component = "partitioner",
                    event = "partitioner_initialized",
                    column = %column,
                    function = %spec.function(),
                    num_partitions = spec.num_partitions().get(),
                    default_null_value = %spec.default_null_value(),
                );
                Strategy::Column(ColumnPartitioner {
                    column: column.clone(),
                    spec: spec.clone(),
                    ordinal: None,
                })
            }
            PartitioningMode::RoundRobin { reducers } => {
                log_info!(
                    component = "partitioner",
                    event = "partitioner_initialized",
                    reducers = reducers.get(),
                    "no partition column configured, spreading records round-robin"
                );
                Strategy::RoundRobin(RoundRobin {
                    reducers: *reducers,
                    counter: 0,
                })
            }
        };
        Self { strategy }
    }

    /// Partition spec in use, if partitioning on a column.
    pub fn spec(&self) -> Option<&PartitionSpec> {
        match &self.strategy {
            Strategy::Column(inner) => Some(&inner.spec),
            Strategy::RoundRobin(_) => None,
        }
    }

    /// Cached ordinal of the partition column, once resolved.
    pub fn resolved_ordinal(&self) -> Option<usize> {
        match &self.strategy {
            Strategy::Column(inner) => inner.ordinal,
            Strategy::RoundRobin(_) => None,
        }
    }

    /// Partition for the record at `row` of `batch`.
    pub fn partition_of(
        &mut self,
        batch: &RecordBatch,
        row: usize,
    ) -> Result<PartitionId, PartitionError> {
        if row >= batch.num_rows() {
            return Err(PartitionError::RowOutOfBounds {
                row,
                num_rows: batch.num_rows(),
            });
        }
        match &mut self.strategy {
            Strategy::Column(inner) => inner.partition_of(batch, row),
            Strategy::RoundRobin(inner) => Ok(inner.next()),
        }
    }

    /// Partitions for every row of `batch`, in row order.
    pub fn partition_batch(
        &mut self,
        batch: &RecordBatch,
    ) -> Result<Vec<PartitionId>, PartitionError> {
        (0..batch.num_rows())
            .map(|row| self.partition_of(batch, row))
            .collect()
    }
}

impl ColumnPartitioner {
    fn partition_of(
        &mut self,
        batch: &RecordBatch,
        row: usize,
    ) -> Result<PartitionId, PartitionError> {
        let ordinal = self.resolve_ordinal(batch)?;
        let column = batch.column(ordinal);
        let key = self
            .spec
            .canonicalizer()
            .canonicalize_cell(column.as_ref(), row)
            .map_err(|reason| {
                let err = ConversionError {
                    column: self.column.clone(),
                    ordinal,
                    row,
                    record: render_record(batch, row),
                    reason,
                };
                log_error!(
                    component = "partitioner",
                    event = "partition_value_conversion_failed",
                    error = %err,
                );
                err
            })?;
        let partition = self.spec.partition_of_key(&key);
        log_debug!(
            component = "partitioner",
            event = "record_partitioned",
            row,
            partition = partition.get(),
        );
        Ok(partition)
    }

    fn resolve_ordinal(&mut self, batch: &RecordBatch) -> Result<usize, ConfigurationError> {
        let schema = batch.schema();
        let cached = self.ordinal.filter(|&ordinal| {
            schema
                .fields()
                .get(ordinal)
                .is_some_and(|field| field.name() == &self.column)
        });
        if let Some(ordinal) = cached {
            return Ok(ordinal);
        }

        // First record, or a batch whose fields are ordered differently.
        let Some(ordinal) = schema
            .fields()
            .iter()
            .position(|field| field.name() == &self.column)
        else {
            let fields = schema
                .fields()
                .iter()
                .map(|field| field.name().clone())
                .collect();
            return Err(ConfigurationError::MissingPartitionColumn {
                column: self.column.clone(),
                fields,
            });
        };
        log_info!(
            component = "partitioner",
            event = "partition_column_resolved",
            column = %self.column,
            ordinal,
            previous = ?self.ordinal,
        );
        self.ordinal = Some(ordinal);
        Ok(ordinal)
    }
}

impl RoundRobin {
    fn next(&mut self) -> PartitionId {
        let shard = self.counter % u64::from(self.reducers.get());
        self.counter = self.counter.wrapping_add(1);
        // `shard < reducers <= u32::MAX`.
        PartitionId::new(shard as u32)
    }
}

fn render_record(batch: &RecordBatch, row: usize) -> String {
    let schema = batch.schema();
    let parts = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, column)| {
            let value = array_value_to_string(column, row).unwrap_or_else(|_| "?".to_string());
            format!("{}={}", field.name(), value)
        })
        .collect::<Vec<_>>();
    format!("{{{}}}", parts.join(", "))
}
