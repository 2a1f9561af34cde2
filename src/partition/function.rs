use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{hash, ConfigurationError, PartitionId};
use crate::canonical::CanonicalKey;

/// Named partition functions shared by ingestion and query-time pruning.
///
/// The set is closed: both sides resolve the configured name to one of these
/// variants at setup, and agreement relies on the table carrying the same
/// name and partition count everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionFunction {
    /// Polynomial hash over UTF-16 code units, absolute value modulo N.
    #[serde(alias = "hashcode")]
    ModuloHash,
    /// MurmurHash2 over UTF-8 bytes, sign bit masked, modulo N.
    #[serde(alias = "murmur2")]
    Murmur,
    /// Polynomial hash over signed UTF-8 bytes, absolute value modulo N.
    #[serde(alias = "bytearray")]
    ByteArray,
}

impl PartitionFunction {
    /// Every supported variant, in declaration order.
    pub const ALL: [PartitionFunction; 3] = [
        PartitionFunction::ModuloHash,
        PartitionFunction::Murmur,
        PartitionFunction::ByteArray,
    ];

    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            PartitionFunction::ModuloHash => "modulo-hash",
            PartitionFunction::Murmur => "murmur",
            PartitionFunction::ByteArray => "byte-array",
        }
    }

    /// Map `key` onto a partition in `[0, num_partitions)`.
    pub fn apply(&self, key: &CanonicalKey, num_partitions: NonZeroU32) -> PartitionId {
        let n = num_partitions.get();
        let value = key.as_str();
        let id = match self {
            PartitionFunction::ModuloHash => hash::utf16_polynomial(value).unsigned_abs() % n,
            PartitionFunction::Murmur => {
                (hash::murmur2(value.as_bytes()) & 0x7fff_ffff) as u32 % n
            }
            PartitionFunction::ByteArray => {
                hash::byte_polynomial(value.as_bytes()).unsigned_abs() % n
            }
        };
        PartitionId::new(id)
    }
}

impl fmt::Display for PartitionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartitionFunction {
    type Err = ConfigurationError;

    /// Case-insensitive; `-` and `_` separators are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "modulohash" | "hashcode" => Ok(PartitionFunction::ModuloHash),
            "murmur" | "murmur2" => Ok(PartitionFunction::Murmur),
            "bytearray" => Ok(PartitionFunction::ByteArray),
            _ => Err(ConfigurationError::UnknownFunction {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    #[test]
    fn resolves_names_and_aliases() {
        assert_eq!(
            "modulo-hash".parse::<PartitionFunction>(),
            Ok(PartitionFunction::ModuloHash)
        );
        assert_eq!(
            "HashCode".parse::<PartitionFunction>(),
            Ok(PartitionFunction::ModuloHash)
        );
        assert_eq!(
            "Murmur".parse::<PartitionFunction>(),
            Ok(PartitionFunction::Murmur)
        );
        assert_eq!(
            "byte_array".parse::<PartitionFunction>(),
            Ok(PartitionFunction::ByteArray)
        );
        for function in PartitionFunction::ALL {
            assert_eq!(function.name().parse::<PartitionFunction>(), Ok(function));
        }
    }

    #[test]
    fn unknown_name_is_configuration_error() {
        let err = "consistent".parse::<PartitionFunction>().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownFunction {
                name: "consistent".to_string()
            }
        );
    }

    #[test]
    fn modulo_hash_matches_reference() {
        let f = PartitionFunction::ModuloHash;
        assert_eq!(f.apply(&CanonicalKey::from("a"), n(4)), PartitionId::new(1));
        assert_eq!(f.apply(&CanonicalKey::from("b"), n(4)), PartitionId::new(2));
        assert_eq!(f.apply(&CanonicalKey::from("c"), n(4)), PartitionId::new(3));
        assert_eq!(f.apply(&CanonicalKey::from(""), n(4)), PartitionId::new(0));
    }

    #[test]
    fn apply_is_total_and_bounded() {
        let mut rng = fastrand::Rng::with_seed(7);
        let keys: Vec<CanonicalKey> = (0..500)
            .map(|i| {
                let len = rng.usize(0..24);
                let s: String = (0..len).map(|_| rng.char(..)).collect();
                CanonicalKey::from(format!("{i}{s}"))
            })
            .chain(std::iter::once(CanonicalKey::from("")))
            .collect();
        for function in PartitionFunction::ALL {
            for partitions in [1, 2, 7, 64, u32::MAX] {
                for key in &keys {
                    let first = function.apply(key, n(partitions));
                    assert!(first.get() < partitions);
                    assert_eq!(first, function.apply(key, n(partitions)));
                }
            }
        }
    }

    #[test]
    fn single_partition_always_zero() {
        for function in PartitionFunction::ALL {
            assert_eq!(
                function.apply(&CanonicalKey::from("anything"), n(1)),
                PartitionId::new(0)
            );
        }
    }
}
