//! The Bitcoin byte codec: little-endian primitives, CompactSize varints, and
//! length-prefixed byte strings, shared by every wire type in this crate.

mod deserialize;
mod error;

pub use deserialize::{BitcoinDeserialize, BitcoinDeserializeInto};
pub use error::SerializationError;

use byteorder::{LittleEndian, WriteBytesExt};
use std::io;

type Result<R> = std::result::Result<R, SerializationError>;

/// Consensus-critical serialization, mirrored by [`BitcoinDeserialize`].
pub trait BitcoinSerialize {
    fn bitcoin_serialize<W: io::Write>(&self, target: W) -> std::result::Result<(), io::Error>;

    fn bitcoin_serialize_to_vec(&self) -> std::result::Result<Vec<u8>, io::Error> {
        let mut data = Vec::new();
        self.bitcoin_serialize(&mut data)?;
        Ok(data)
    }
}

// No direct `impl BitcoinSerialize for u8`: it would overlap with the
// blanket `Vec<T>` impl below once coherence checking considers `Vec<u8>`.
// Until specialization stabilizes, single bytes go through `write_all`
// directly (see `CompactSize`) rather than through the trait.

impl BitcoinSerialize for u16 {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        target.write_u16::<LittleEndian>(*self)
    }
}

impl BitcoinSerialize for u32 {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        target.write_u32::<LittleEndian>(*self)
    }
}

impl BitcoinSerialize for u64 {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        target.write_u64::<LittleEndian>(*self)
    }
}

impl BitcoinSerialize for i32 {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        target.write_i32::<LittleEndian>(*self)
    }
}

impl BitcoinSerialize for [u8; 32] {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        target.write_all(self)
    }
}

impl BitcoinSerialize for Vec<u8> {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        CompactSize::from(self.len()).bitcoin_serialize(&mut target)?;
        target.write_all(self)
    }
}

impl<T> BitcoinSerialize for Vec<T>
where
    T: BitcoinSerialize,
{
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        CompactSize::from(self.len()).bitcoin_serialize(&mut target)?;
        for item in self.iter() {
            item.bitcoin_serialize(&mut target)?;
        }
        Ok(())
    }
}

impl<T: BitcoinSerialize> BitcoinSerialize for &T {
    fn bitcoin_serialize<W: io::Write>(&self, target: W) -> std::result::Result<(), io::Error> {
        (*self).bitcoin_serialize(target)
    }
}

/// Bitcoin's variable-length integer encoding.
///
/// The first byte `b` selects the width: `b < 0xFD` encodes the value
/// directly (1 byte total); `0xFD` is followed by a little-endian `u16` (3
/// bytes total); `0xFE` by a little-endian `u32` (5 bytes total); `0xFF` by a
/// little-endian `u64` (9 bytes total). Writers always use the shortest form
/// that can represent the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSize(u64);

impl CompactSize {
    pub const fn from(value: usize) -> CompactSize {
        CompactSize(value as u64)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The number of bytes the shortest encoding of `value` occupies.
    pub fn size(value: usize) -> usize {
        if value < 0xFD {
            1
        } else if value <= u16::MAX as usize {
            3
        } else if value <= u32::MAX as usize {
            5
        } else {
            9
        }
    }
}

impl BitcoinSerialize for CompactSize {
    fn bitcoin_serialize<W: io::Write>(&self, mut target: W) -> std::result::Result<(), io::Error> {
        if self.0 < 0xFD {
            target.write_all(&[self.0 as u8])
        } else if self.0 <= u16::MAX as u64 {
            target.write_all(&[0xFD])?;
            target.write_u16::<LittleEndian>(self.0 as u16)
        } else if self.0 <= u32::MAX as u64 {
            target.write_all(&[0xFE])?;
            target.write_u32::<LittleEndian>(self.0 as u32)
        } else {
            target.write_all(&[0xFF])?;
            target.write_u64::<LittleEndian>(self.0)
        }
    }
}

impl BitcoinDeserialize for CompactSize {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<CompactSize> {
        let first = u8::bitcoin_deserialize(&mut reader)?;
        CompactSize::deserialize_with_first_byte(first, reader)
    }
}

impl CompactSize {
    /// Finishes decoding a `CompactSize` whose first byte has already been
    /// consumed by the caller (transaction parsing peeks this byte to
    /// distinguish the SegWit marker from a zero-input transaction).
    pub(crate) fn deserialize_with_first_byte<R: io::Read>(first: u8, mut reader: R) -> Result<CompactSize> {
        Ok(match first {
            0xFD => CompactSize::from(u16::bitcoin_deserialize(&mut reader)? as usize),
            0xFE => CompactSize::from(u32::bitcoin_deserialize(&mut reader)? as usize),
            0xFF => CompactSize::from(u64::bitcoin_deserialize(&mut reader)? as usize),
            small => CompactSize::from(small as usize),
        })
    }
}
