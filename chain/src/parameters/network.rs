//! The two Bitcoin networks this crate knows canonical parameters for.

/// Selects between mainnet and testnet genesis blocks and activation tables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}
