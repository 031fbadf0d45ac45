//! Genesis block identities for each network.

use crate::h256::H256;
use crate::parameters::Network;

/// The previous-block hash carried by every genesis block: Bitcoin's `null`
/// value, `[0; 32]`.
pub const GENESIS_PREVIOUS_BLOCK_HASH: H256 = H256::ZERO;

/// Returns the canonical genesis block hash for `network`.
pub fn genesis_hash(network: Network) -> H256 {
    match network {
        // bitcoin-cli getblockhash 0
        Network::Mainnet => "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        // bitcoin-cli -testnet getblockhash 0
        Network::Testnet => "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943",
    }
    .parse()
    .expect("hard-coded hash parses")
}
