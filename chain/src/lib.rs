//! Data types and wire codec for the block validation core: hashes,
//! transactions, headers, blocks, the Merkle engine, proof-of-work target
//! expansion, and the network parameters validation consults.

pub mod bip34;
pub mod block;
pub mod cached;
pub mod h256;
pub mod merkle;
pub mod parameters;
pub mod script;
pub mod serialization;
pub mod transaction;
pub mod transparent;
pub mod work;

pub use block::{Block, Header};
pub use h256::H256;
pub use serialization::{BitcoinDeserialize, BitcoinSerialize, CompactSize, SerializationError};
pub use transaction::Transaction;
