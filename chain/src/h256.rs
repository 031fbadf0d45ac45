use std::{fmt, str::FromStr};

use sha2::{Digest, Sha256};

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};

/// A 32-byte double-SHA256 digest, used as both the block identity hash and
/// the transaction txid/wtxid.
///
/// `H256` carries no endianness at the type level: the wire encoding is
/// little-endian (matching the byte order SHA256 produces), while the
/// display/parse form reverses the bytes, following the big-endian
/// convention Bitcoin explorers and RPCs use for block and transaction ids.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(proptest_derive::Arbitrary))]
pub struct H256(pub [u8; 32]);

impl H256 {
    pub const ZERO: H256 = H256([0; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> H256 {
        H256(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.debug_tuple("H256").field(&hex::encode(reversed)).finish()
    }
}

impl FromStr for H256 {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes[..])
            .map_err(|_| SerializationError::Parse("invalid hex in H256"))?;
        bytes.reverse();
        Ok(H256(bytes))
    }
}

impl BitcoinSerialize for H256 {
    fn bitcoin_serialize<W: std::io::Write>(&self, target: W) -> Result<(), std::io::Error> {
        self.0.bitcoin_serialize(target)
    }
}

impl BitcoinDeserialize for H256 {
    fn bitcoin_deserialize<R: std::io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(H256(<[u8; 32]>::bitcoin_deserialize(reader)?))
    }
}

/// Writer that accumulates bytes and produces their double-SHA256 digest.
///
/// Hashing a header or a transaction reuses the same serializer that writes
/// it to the wire: the hashed bytes and the wire bytes can never drift apart.
#[derive(Default)]
pub struct Sha256dWriter {
    hasher: Sha256,
}

impl Sha256dWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> H256 {
        let first = self.hasher.finalize();
        let second = Sha256::digest(&first);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&second);
        H256(bytes)
    }
}

impl std::io::Write for Sha256dWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.hasher.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Double-SHA256 of `bytes` in one call, for callers that already have a
/// contiguous buffer instead of something to stream through a writer.
pub fn sha256d(bytes: &[u8]) -> H256 {
    let mut writer = Sha256dWriter::new();
    std::io::Write::write_all(&mut writer, bytes).expect("writing to a Sha256dWriter is infallible");
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reverses_bytes_relative_to_wire_order() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0xcd;
        let hash = H256(bytes);
        let text = hash.to_string();
        assert!(text.starts_with("cd"));
        assert!(text.ends_with("ab"));
    }

    #[test]
    fn from_str_round_trips_through_display() {
        let hash = H256::from_bytes([7u8; 32]);
        let parsed: H256 = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn known_double_sha256_vector() {
        // SHA256(SHA256("")), in wire (little-endian) byte order.
        let digest = sha256d(b"");
        assert_eq!(
            hex::encode(digest.as_bytes()),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }
}
