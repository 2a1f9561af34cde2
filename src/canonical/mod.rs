//! Canonical text form of partition column values.
//!
//! Ingestion reads values out of Arrow columns while query-time pruning starts
//! from predicate literals. Both are lowered to [`PartitionValue`] and rendered
//! by the same rule, so logically equal values produce the same
//! [`CanonicalKey`] regardless of which side asks. Integer `42`, unsigned
//! `42u64` and the string `"42"` all canonicalize to `42`.

mod value;

use std::{borrow::Borrow, fmt};

use arrow::array::Array;
pub use value::PartitionValue;

use crate::partition::ConversionFailure;

/// Text form of a column value fed to a partition function.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Borrow the canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key and return its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for CanonicalKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CanonicalKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders values into [`CanonicalKey`]s under a fixed null policy.
///
/// Null values canonicalize to the configured default-null string verbatim,
/// which keeps every null-valued record in one deterministic partition.
#[derive(Clone, Copy, Debug)]
pub struct Canonicalizer<'a> {
    default_null_value: &'a str,
}

impl<'a> Canonicalizer<'a> {
    /// Build a canonicalizer that maps nulls to `default_null_value`.
    pub fn new(default_null_value: &'a str) -> Self {
        Self { default_null_value }
    }

    /// Canonicalize an already extracted value (query literal path).
    pub fn canonicalize(&self, value: &PartitionValue<'_>) -> CanonicalKey {
        match value {
            PartitionValue::Null => CanonicalKey::from(self.default_null_value),
            other => CanonicalKey(other.render()),
        }
    }

    /// Canonicalize the cell at `row` of `column` (ingestion path).
    pub fn canonicalize_cell(
        &self,
        column: &dyn Array,
        row: usize,
    ) -> Result<CanonicalKey, ConversionFailure> {
        let value = PartitionValue::from_array(column, row)?;
        Ok(self.canonicalize(&value))
    }
}
