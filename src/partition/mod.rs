//! Partition identity and the function contract shared by ingestion and routing.
//!
//! A [`PartitionSpec`] is fixed per table: the same function, partition count,
//! and default-null value must be used by the record partitioner that writes
//! segments and by the pruner that later selects them. Nothing negotiates this
//! agreement at runtime; it holds only because both sides build their spec
//! from the same table configuration.

mod error;
mod function;
mod hash;

use std::{fmt, num::NonZeroU32};

pub use error::{ConfigurationError, ConversionError, ConversionFailure, PartitionError};
pub use function::PartitionFunction;
use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalKey, Canonicalizer};

/// Default-null value used when none is configured.
pub const DEFAULT_NULL_VALUE: &str = "null";

/// Partition identifier in `[0, N)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(u32);

impl PartitionId {
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw partition number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Table-level partitioning contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionSpec {
    function: PartitionFunction,
    num_partitions: NonZeroU32,
    #[serde(default = "default_null_value")]
    default_null_value: String,
}

fn default_null_value() -> String {
    DEFAULT_NULL_VALUE.to_string()
}

impl PartitionSpec {
    /// Build a spec using the default `"null"` placeholder for null values.
    pub fn new(function: PartitionFunction, num_partitions: NonZeroU32) -> Self {
        Self {
            function,
            num_partitions,
            default_null_value: default_null_value(),
        }
    }

    /// Resolve a function by name and validate the partition count.
    pub fn from_parts(
        function_name: &str,
        num_partitions: u32,
        default_null_value: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let function = function_name.parse()?;
        let num_partitions = NonZeroU32::new(num_partitions).ok_or_else(|| {
            ConfigurationError::InvalidPartitionCount {
                value: num_partitions.to_string(),
            }
        })?;
        Ok(Self::new(function, num_partitions).with_default_null_value(default_null_value))
    }

    /// Replace the string that null column values canonicalize to.
    #[must_use]
    pub fn with_default_null_value(mut self, value: impl Into<String>) -> Self {
        self.default_null_value = value.into();
        self
    }

    /// Partition function.
    pub fn function(&self) -> PartitionFunction {
        self.function
    }

    /// Number of partitions.
    pub fn num_partitions(&self) -> NonZeroU32 {
        self.num_partitions
    }

    /// Canonical text that null values are partitioned as.
    pub fn default_null_value(&self) -> &str {
        &self.default_null_value
    }

    /// Canonicalizer bound to this spec's null policy.
    pub fn canonicalizer(&self) -> Canonicalizer<'_> {
        Canonicalizer::new(&self.default_null_value)
    }

    /// Partition for an already canonical key.
    pub fn partition_of_key(&self, key: &CanonicalKey) -> PartitionId {
        self.function.apply(key, self.num_partitions)
    }
}
