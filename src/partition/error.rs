use arrow::datatypes::DataType;

/// Setup-time misconfiguration. Always fatal to the whole ingestion job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The configured partition function name does not resolve to a known variant.
    #[error("unknown partition function `{name}`")]
    UnknownFunction {
        /// Name as it appeared in configuration.
        name: String,
    },
    /// A property required by the selected partitioning mode is absent.
    #[error("missing required property `{key}`")]
    MissingProperty {
        /// Property key that was not set.
        key: &'static str,
    },
    /// Partition count is not a positive integer.
    #[error("invalid partition count `{value}`: must be a positive integer")]
    InvalidPartitionCount {
        /// Raw configured value.
        value: String,
    },
    /// Reducer count for round-robin mode is not a positive integer.
    #[error("invalid reducer count `{value}`: must be a positive integer")]
    InvalidReducerCount {
        /// Raw configured value.
        value: String,
    },
    /// The partition column is not part of the record schema.
    #[error("failed to find partition column `{column}` in record fields {fields:?}")]
    MissingPartitionColumn {
        /// Configured partition column.
        column: String,
        /// Field names present in the record schema.
        fields: Vec<String>,
    },
}

/// Why a single cell could not be rendered to its canonical text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionFailure {
    /// The column's Arrow type has no canonical text form.
    #[error("unsupported data type {0:?}")]
    UnsupportedType(DataType),
    /// The column array did not downcast to the array type its data type announces.
    #[error("array does not match declared data type {0:?}")]
    ArrayMismatch(DataType),
    /// Row index is outside the column.
    #[error("invalid row index {row} (num_rows={num_rows})")]
    RowOutOfBounds {
        /// Requested row.
        row: usize,
        /// Rows in the column.
        num_rows: usize,
    },
}

/// A record's partition column value could not be canonicalized.
///
/// Fatal for the record (and the task processing it). The record is rendered
/// into `record` so the failure can be diagnosed from logs alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "failed to process partition column `{column}`, ordinal {ordinal}, at row {row} of record \
     {record}: {reason}"
)]
pub struct ConversionError {
    /// Partition column name.
    pub column: String,
    /// Ordinal of the column within the record schema.
    pub ordinal: usize,
    /// Row index within the batch.
    pub row: usize,
    /// Text rendering of the offending record.
    pub record: String,
    /// Underlying failure.
    pub reason: ConversionFailure,
}

/// Error returned by [`crate::partitioner::RecordPartitioner`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// Job-level misconfiguration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Record-level conversion failure.
    #[error(transparent)]
    Conversion(#[from] Box<ConversionError>),
    /// Requested row is outside the batch.
    #[error("invalid row index {row} (num_rows={num_rows})")]
    RowOutOfBounds {
        /// Requested row.
        row: usize,
        /// Rows in the batch.
        num_rows: usize,
    },
}

impl From<ConversionError> for PartitionError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(Box::new(err))
    }
}
