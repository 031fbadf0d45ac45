//! Compact-target (`nBits`) expansion and proof-of-work comparison.
//!
//! Generalizes the teacher's `CompactDifficulty`/`ExpandedDifficulty` split
//! (originally sized for Zcash's 256-bit Equihash target) to the SHA256d
//! target comparison Bitcoin proof-of-work uses.

use std::cmp::Ordering;

use crate::h256::H256;
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};

/// The `bits` field of a block header: an exponent byte and a 3-byte
/// mantissa, packed into a `u32`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(proptest_derive::Arbitrary))]
pub struct CompactDifficulty(pub u32);

/// A 256-bit unsigned target, stored big-endian so that byte-wise
/// lexicographic comparison is numeric comparison.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct ExpandedDifficulty([u8; 32]);

impl ExpandedDifficulty {
    pub const fn zero() -> ExpandedDifficulty {
        ExpandedDifficulty([0; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl CompactDifficulty {
    /// Expands the compact representation into a full 256-bit target.
    ///
    /// Returns the zero target (always "invalid": nothing can be less than
    /// it) when the mantissa's negative-sign bit is set or the exponent
    /// overflows a 256-bit result.
    pub fn to_expanded(self) -> ExpandedDifficulty {
        let exponent = self.0 >> 24;
        let mantissa = self.0 & 0x00ff_ffff;

        if mantissa & 0x0080_0000 != 0 || exponent > 32 {
            return ExpandedDifficulty::zero();
        }

        let mantissa_bytes = mantissa.to_be_bytes();
        let mantissa_bytes = &mantissa_bytes[1..]; // low 3 bytes, big-endian

        let mut target = [0u8; 32];
        if exponent >= 3 {
            let shift_bytes = (exponent - 3) as usize;
            if shift_bytes > 29 {
                return ExpandedDifficulty::zero();
            }
            let end = 32 - shift_bytes;
            target[end - 3..end].copy_from_slice(mantissa_bytes);
        } else {
            let shift_bits = 8 * (3 - exponent);
            let value = mantissa >> shift_bits;
            target[28..32].copy_from_slice(&value.to_be_bytes());
        }
        ExpandedDifficulty(target)
    }
}

impl BitcoinSerialize for CompactDifficulty {
    fn bitcoin_serialize<W: std::io::Write>(&self, target: W) -> Result<(), std::io::Error> {
        self.0.bitcoin_serialize(target)
    }
}

impl BitcoinDeserialize for CompactDifficulty {
    fn bitcoin_deserialize<R: std::io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(CompactDifficulty(u32::bitcoin_deserialize(reader)?))
    }
}

/// Compares a block's proof-of-work hash (wire/little-endian byte order)
/// against an expanded target, both treated as unsigned 256-bit integers.
pub fn pow_hash_order(hash: H256, target: ExpandedDifficulty) -> Ordering {
    let mut big_endian_hash = *hash.as_bytes();
    big_endian_hash.reverse();
    big_endian_hash.cmp(target.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponent_three_places_mantissa_in_the_low_bytes() {
        let expanded = CompactDifficulty(0x0300_0001).to_expanded();
        let mut expected = [0u8; 32];
        expected[29..32].copy_from_slice(&[0, 0, 1]);
        assert_eq!(expanded.as_bytes(), &expected);
    }

    #[test]
    fn negative_mantissa_bit_yields_zero_target() {
        let expanded = CompactDifficulty(0x0480_0000).to_expanded();
        assert!(expanded.is_zero());
    }

    #[test]
    fn exponent_overflow_yields_zero_target() {
        let expanded = CompactDifficulty(0xff00_0001).to_expanded();
        assert!(expanded.is_zero());
    }

    #[test]
    fn mainnet_genesis_bits_expand_to_the_known_target() {
        // 0x1d00ffff: exponent 0x1d (29), mantissa 0x00ffff.
        let expanded = CompactDifficulty(0x1d00_ffff).to_expanded();
        let mut expected = [0u8; 32];
        // 3 leading zero bytes, then the mantissa, then 26 trailing zero bytes.
        expected[3..6].copy_from_slice(&[0x00, 0xff, 0xff]);
        assert_eq!(expanded.as_bytes(), &expected);
    }

    #[test]
    fn zero_hash_is_below_any_nonzero_target() {
        let target = CompactDifficulty(0x1d00_ffff).to_expanded();
        assert_eq!(pow_hash_order(H256::ZERO, target), Ordering::Less);
    }
}
