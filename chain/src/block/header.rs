//! The fixed 80-byte block header.

use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};

use crate::cached::Cached;
use crate::h256::{sha256d, H256};
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize};
use crate::work::difficulty::CompactDifficulty;

/// A block header, containing metadata about a block.
///
/// Blocks are chained together by `previous_block_hash`, all the way back to
/// the genesis block. `merkle_root` binds the header to the transactions in
/// the block it belongs to.
///
/// `Header` doesn't derive `proptest::Arbitrary` directly: `Cached<T>` isn't
/// `Arbitrary`, so the strategy is hand-written in `block::arbitrary`, the
/// way the teacher writes it rather than deriving it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BtcSerialize, BtcDeserialize)]
pub struct Header {
    pub version: i32,
    pub previous_block_hash: H256,
    pub merkle_root: H256,
    /// Seconds since the Unix epoch, as reported by the miner.
    pub timestamp: u32,
    pub bits: CompactDifficulty,
    pub nonce: u32,

    /// Not part of the wire serialization: the header's own hash, filled in
    /// when known (e.g. by a deserializer that already hashed the bytes it
    /// read) and recomputed on demand otherwise.
    hash: Cached<H256>,
    /// Not part of the wire serialization: the BIP 34 height this header's
    /// block reported, if it has been looked up.
    reported_height: Cached<usize>,
}

impl Header {
    pub const fn len() -> usize {
        80
    }

    pub fn new(
        version: i32,
        previous_block_hash: H256,
        merkle_root: H256,
        timestamp: u32,
        bits: CompactDifficulty,
        nonce: u32,
    ) -> Header {
        Header {
            version,
            previous_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
            hash: Cached::empty(),
            reported_height: Cached::empty(),
        }
    }

    /// The proof-of-work hash: double-SHA256 of the 80-byte serialization.
    ///
    /// Uses the cached value when one was published at construction time
    /// (e.g. by a deserializer that hashed the bytes it consumed); otherwise
    /// recomputes from the current field values.
    pub fn hash(&self) -> H256 {
        match self.hash.value() {
            Some(hash) => {
                tracing::trace!("header hash cache hit");
                hash
            }
            None => {
                tracing::trace!("header hash cache miss, recomputing");
                sha256d(
                    &self
                        .bitcoin_serialize_to_vec()
                        .expect("writing to a Vec is infallible"),
                )
            }
        }
    }

    pub fn reported_height(&self) -> Option<usize> {
        self.reported_height.value()
    }

    pub fn with_reported_height(mut self, height: usize) -> Header {
        self.reported_height = Cached::filled(height);
        self
    }

    fn bitcoin_serialize_to_vec(&self) -> std::result::Result<Vec<u8>, std::io::Error> {
        let mut out = Vec::with_capacity(Header::len());
        self.bitcoin_serialize(&mut out)?;
        Ok(out)
    }

    /// Deserializes a header from exactly 80 bytes, caching the hash of the
    /// bytes it reads so `hash()` never has to re-serialize.
    pub fn deserialize_with_hash<R: std::io::Read>(
        mut reader: R,
    ) -> std::result::Result<Header, crate::serialization::SerializationError> {
        let mut bytes = [0u8; Header::len()];
        std::io::Read::read_exact(&mut reader, &mut bytes)?;
        let hash = sha256d(&bytes);
        let mut cursor = std::io::Cursor::new(&bytes[..]);
        let mut header = Header::bitcoin_deserialize(&mut cursor)?;
        header.hash = Cached::filled(hash);
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header::new(1, H256::ZERO, H256::ZERO, 1_231_006_505, CompactDifficulty(0x1d00ffff), 2083236893)
    }

    #[test]
    fn serialized_length_is_eighty_bytes() {
        let header = sample();
        assert_eq!(header.bitcoin_serialize_to_vec().unwrap().len(), Header::len());
    }

    #[test]
    fn deserialize_with_hash_matches_recomputed_hash() {
        let header = sample();
        let bytes = header.bitcoin_serialize_to_vec().unwrap();
        let reparsed = Header::deserialize_with_hash(&bytes[..]).unwrap();
        assert_eq!(reparsed.hash(), header.hash());
    }

    #[test]
    fn reported_height_defaults_to_none() {
        assert_eq!(sample().reported_height(), None);
        assert_eq!(sample().with_reported_height(100).reported_height(), Some(100));
    }
}
