//! Stable 32-bit hash primitives backing the partition functions.
//!
//! Every routine here is bit-for-bit reproducible across hosts and releases:
//! no seeds are randomised and no platform hashers are involved. Murmur
//! matches the Kafka client's `murmur2`, so keys partitioned by a Kafka
//! producer land on the same partition here.

const MURMUR2_SEED: u32 = 0x9747_b28c;
const MURMUR2_M: u32 = 0x5bd1_e995;
const MURMUR2_R: u32 = 24;

/// MurmurHash2 (32-bit) over `data` with the conventional `0x9747b28c` seed.
pub(crate) fn murmur2(data: &[u8]) -> i32 {
    let len = data.len();
    let mut h = MURMUR2_SEED ^ (len as u32);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(MURMUR2_M);
        k ^= k >> MURMUR2_R;
        k = k.wrapping_mul(MURMUR2_M);
        h = h.wrapping_mul(MURMUR2_M);
        h ^= k;
    }

    let tail = chunks.remainder();
    if tail.len() >= 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        h ^= u32::from(tail[0]);
        h = h.wrapping_mul(MURMUR2_M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(MURMUR2_M);
    h ^= h >> 15;
    h as i32
}

/// Polynomial (`31 * h + c`) hash over the UTF-16 code units of `value`.
pub(crate) fn utf16_polynomial(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Polynomial (`31 * h + b`) hash over signed bytes, seeded with 1.
pub(crate) fn byte_polynomial(data: &[u8]) -> i32 {
    data.iter().fold(1i32, |h, &b| {
        h.wrapping_mul(31).wrapping_add(i32::from(b as i8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn murmur2_known_vectors() {
        assert_eq!(murmur2(b"21"), -973_932_308);
        assert_eq!(murmur2(b"foobar"), -790_332_482);
        assert_eq!(murmur2(b"abc"), 479_470_107);
    }

    #[test]
    fn murmur2_handles_every_tail_length() {
        // Lengths 0..=8 cover each remainder branch at least twice.
        let data = b"abcdefgh";
        let hashes: Vec<i32> = (0..=data.len()).map(|n| murmur2(&data[..n])).collect();
        let again: Vec<i32> = (0..=data.len()).map(|n| murmur2(&data[..n])).collect();
        assert_eq!(hashes, again);
        let mut unique = hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), hashes.len());
    }

    #[test]
    fn utf16_polynomial_matches_reference_values() {
        assert_eq!(utf16_polynomial(""), 0);
        assert_eq!(utf16_polynomial("a"), 97);
        assert_eq!(utf16_polynomial("abc"), 96_354);
        // Non-BMP characters hash as surrogate pairs.
        let pair: Vec<u16> = "😀".encode_utf16().collect();
        assert_eq!(pair.len(), 2);
        let expected = i32::from(pair[0])
            .wrapping_mul(31)
            .wrapping_add(i32::from(pair[1]));
        assert_eq!(utf16_polynomial("😀"), expected);
    }

    #[test]
    fn byte_polynomial_uses_signed_bytes() {
        assert_eq!(byte_polynomial(&[]), 1);
        assert_eq!(byte_polynomial(b"a"), 31 + 97);
        assert_eq!(byte_polynomial(&[0xff]), 31 - 1);
    }
}
