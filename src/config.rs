//! Partitioner configuration read from a flat property map.
//!
//! Loading the map is the caller's job; this module only interprets the keys
//! and validates them up front, so a bad function name or partition count
//! fails the job before the first record is read.

use std::{collections::HashMap, num::NonZeroU32};

use serde::{Deserialize, Serialize};

use crate::partition::{ConfigurationError, PartitionFunction, PartitionSpec, DEFAULT_NULL_VALUE};

/// Name of the column records are partitioned on. Absent means round-robin.
pub const PARTITION_COLUMN: &str = "partition.column";
/// Partition function name.
pub const PARTITION_FUNCTION: &str = "partition.function";
/// Number of partitions.
pub const NUM_PARTITIONS: &str = "partition.num.partitions";
/// Canonical text that null partition column values map to.
pub const PARTITION_COLUMN_DEFAULT_NULL_VALUE: &str = "partition.column.default.null.value";
/// Number of output shards for round-robin mode.
pub const NUM_REDUCERS: &str = "partition.num.reducers";

/// Function used when a partition column is set but no function is named.
pub const DEFAULT_PARTITION_FUNCTION: PartitionFunction = PartitionFunction::Murmur;

/// How records are assigned to output shards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PartitioningMode {
    /// Deterministic partitioning on one column.
    Column {
        /// Partition column name.
        column: String,
        /// Table-level partition contract.
        spec: PartitionSpec,
    },
    /// Best-effort spreading over `reducers` shards; not reproducible.
    RoundRobin {
        /// Number of output shards.
        reducers: NonZeroU32,
    },
}

/// Validated configuration for a [`crate::partitioner::RecordPartitioner`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionerConfig {
    mode: PartitioningMode,
}

impl PartitionerConfig {
    /// Partition on `column` under `spec`.
    pub fn column(column: impl Into<String>, spec: PartitionSpec) -> Self {
        Self {
            mode: PartitioningMode::Column {
                column: column.into(),
                spec,
            },
        }
    }

    /// Spread records over `reducers` shards.
    pub fn round_robin(reducers: NonZeroU32) -> Self {
        Self {
            mode: PartitioningMode::RoundRobin { reducers },
        }
    }

    /// Interpret and validate a property map.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigurationError> {
        let get = |key: &str| {
            props
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let Some(column) = get(PARTITION_COLUMN) else {
            let raw = get(NUM_REDUCERS)
                .ok_or(ConfigurationError::MissingProperty { key: NUM_REDUCERS })?;
            let reducers = parse_positive(raw).ok_or_else(|| {
                ConfigurationError::InvalidReducerCount {
                    value: raw.to_string(),
                }
            })?;
            return Ok(Self::round_robin(reducers));
        };

        let function = match get(PARTITION_FUNCTION) {
            Some(name) => name.parse()?,
            None => DEFAULT_PARTITION_FUNCTION,
        };
        let raw = get(NUM_PARTITIONS).ok_or(ConfigurationError::MissingProperty {
            key: NUM_PARTITIONS,
        })?;
        let num_partitions =
            parse_positive(raw).ok_or_else(|| ConfigurationError::InvalidPartitionCount {
                value: raw.to_string(),
            })?;
        // The null placeholder is taken verbatim; whitespace is significant.
        let default_null = props
            .get(PARTITION_COLUMN_DEFAULT_NULL_VALUE)
            .map(String::as_str)
            .unwrap_or(DEFAULT_NULL_VALUE);

        let spec =
            PartitionSpec::new(function, num_partitions).with_default_null_value(default_null);
        Ok(Self::column(column, spec))
    }

    /// Selected mode.
    pub fn mode(&self) -> &PartitioningMode {
        &self.mode
    }

    /// Partition spec when partitioning on a column.
    pub fn spec(&self) -> Option<&PartitionSpec> {
        match &self.mode {
            PartitioningMode::Column { spec, .. } => Some(spec),
            PartitioningMode::RoundRobin { .. } => None,
        }
    }

    /// Partition column name when partitioning on a column.
    pub fn partition_column(&self) -> Option<&str> {
        match &self.mode {
            PartitioningMode::Column { column, .. } => Some(column),
            PartitioningMode::RoundRobin { .. } => None,
        }
    }
}

fn parse_positive(raw: &str) -> Option<NonZeroU32> {
    raw.parse::<u32>().ok().and_then(NonZeroU32::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn column_mode_from_properties() {
        let config = PartitionerConfig::from_properties(&props(&[
            (PARTITION_COLUMN, "member_id"),
            (PARTITION_FUNCTION, "Murmur"),
            (NUM_PARTITIONS, "8"),
            (PARTITION_COLUMN_DEFAULT_NULL_VALUE, "-1"),
        ]))
        .expect("valid config");

        assert_eq!(config.partition_column(), Some("member_id"));
        let spec = config.spec().expect("column mode");
        assert_eq!(spec.function(), PartitionFunction::Murmur);
        assert_eq!(spec.num_partitions().get(), 8);
        assert_eq!(spec.default_null_value(), "-1");
    }

    #[test]
    fn column_mode_defaults() {
        let config = PartitionerConfig::from_properties(&props(&[
            (PARTITION_COLUMN, "id"),
            (NUM_PARTITIONS, "2"),
        ]))
        .expect("valid config");
        let spec = config.spec().expect("column mode");
        assert_eq!(spec.function(), DEFAULT_PARTITION_FUNCTION);
        assert_eq!(spec.default_null_value(), DEFAULT_NULL_VALUE);
    }

    #[test]
    fn round_robin_without_column() {
        let config = PartitionerConfig::from_properties(&props(&[(NUM_REDUCERS, "5")]))
            .expect("valid config");
        assert_eq!(
            config.mode(),
            &PartitioningMode::RoundRobin {
                reducers: NonZeroU32::new(5).expect("non-zero")
            }
        );
        assert!(config.spec().is_none());
    }

    #[test]
    fn invalid_configs_fail_fast() {
        assert_eq!(
            PartitionerConfig::from_properties(&props(&[(PARTITION_COLUMN, "id")])),
            Err(ConfigurationError::MissingProperty {
                key: NUM_PARTITIONS
            })
        );
        assert_eq!(
            PartitionerConfig::from_properties(&props(&[
                (PARTITION_COLUMN, "id"),
                (NUM_PARTITIONS, "-3"),
            ])),
            Err(ConfigurationError::InvalidPartitionCount {
                value: "-3".to_string()
            })
        );
        assert_eq!(
            PartitionerConfig::from_properties(&props(&[
                (PARTITION_COLUMN, "id"),
                (NUM_PARTITIONS, "0"),
            ])),
            Err(ConfigurationError::InvalidPartitionCount {
                value: "0".to_string()
            })
        );
        assert!(matches!(
            PartitionerConfig::from_properties(&props(&[
                (PARTITION_COLUMN, "id"),
                (PARTITION_FUNCTION, "bogus"),
                (NUM_PARTITIONS, "4"),
            ])),
            Err(ConfigurationError::UnknownFunction { .. })
        ));
        assert_eq!(
            PartitionerConfig::from_properties(&props(&[])),
            Err(ConfigurationError::MissingProperty { key: NUM_REDUCERS })
        );
        assert_eq!(
            PartitionerConfig::from_properties(&props(&[(NUM_REDUCERS, "zero")])),
            Err(ConfigurationError::InvalidReducerCount {
                value: "zero".to_string()
            })
        );
    }

    #[test]
    fn config_serializes_with_mode_tag() {
        let config = PartitionerConfig::round_robin(NonZeroU32::new(3).expect("non-zero"));
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["mode"]["mode"], "round_robin");
        assert_eq!(json["mode"]["reducers"], 3);
        let decoded: PartitionerConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, config);
    }
}
