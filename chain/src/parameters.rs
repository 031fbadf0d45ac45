//! Static network parameters: which network, its genesis block, and its
//! soft-fork activation heights.

mod activation;
mod genesis;
mod network;

pub use activation::SoftFork;
pub use genesis::{genesis_hash, GENESIS_PREVIOUS_BLOCK_HASH};
pub use network::Network;
