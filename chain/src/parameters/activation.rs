//! Canonical soft-fork activation heights for each network.
//!
//! These are a static lookup table, not a chain-state query: `accept`'s
//! height-gated checks (BIP 34 coinbase script, BIP 113 MTP locktime, the
//! SegWit commitment) need *some* canonical source of truth for tests and
//! for the reference `ChainState` the consensus crate's tests construct.
//! The live fork state a full node uses is the external `ChainState`
//! collaborator's concern; this table exists so the two agree on mainnet
//! and testnet history.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use SoftFork::*;

use crate::parameters::Network;

/// A Bitcoin soft fork that changes the rules checked by `accept`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum SoftFork {
    /// The original rules, before any soft fork in this table.
    Genesis,
    /// [BIP 34](https://github.com/bitcoin/bips/blob/master/bip-0034.mediawiki):
    /// version-2 blocks must encode their height at the start of the
    /// coinbase script.
    BIP34,
    /// [BIP 66](https://github.com/bitcoin/bips/blob/master/bip-0066.mediawiki):
    /// strict DER signature encoding.
    BIP66,
    /// [BIP 65](https://github.com/bitcoin/bips/blob/master/bip-0065.mediawiki):
    /// `OP_CHECKLOCKTIMEVERIFY`.
    BIP65,
    /// [BIP 112](https://github.com/bitcoin/bips/blob/master/bip-0112.mediawiki):
    /// `OP_CHECKSEQUENCEVERIFY`, buried alongside BIP 113's MTP locktime rule.
    CSV,
    /// Segregated Witness: [BIP 141](https://github.com/bitcoin/bips/blob/master/bip-0141.mediawiki),
    /// [BIP 143](https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki),
    /// [BIP 144](https://github.com/bitcoin/bips/blob/master/bip-0144.mediawiki).
    SegWit,
}

pub(crate) const MAINNET_ACTIVATION_HEIGHTS: &[(u32, SoftFork)] = &[
    (0, Genesis),
    (227_931, BIP34),
    (363_725, BIP66),
    (388_381, BIP65),
    (419_328, CSV),
    (481_824, SegWit),
];

pub(crate) const TESTNET_ACTIVATION_HEIGHTS: &[(u32, SoftFork)] = &[
    (0, Genesis),
    (21_111, BIP34),
    (330_776, BIP66),
    (581_885, BIP65),
    (770_112, CSV),
    (834_624, SegWit),
];

impl SoftFork {
    /// The activation table for `network`, keyed by the height each fork
    /// first takes effect.
    pub(crate) fn activation_list(network: Network) -> BTreeMap<u32, SoftFork> {
        match network {
            Network::Mainnet => MAINNET_ACTIVATION_HEIGHTS,
            Network::Testnet => TESTNET_ACTIVATION_HEIGHTS,
        }
        .iter()
        .cloned()
        .collect()
    }

    /// The most recently activated fork as of `height` on `network`.
    pub fn current(network: Network, height: u32) -> SoftFork {
        SoftFork::activation_list(network)
            .range(..=height)
            .map(|(_, fork)| *fork)
            .next_back()
            .expect("every height has a current soft fork, since Genesis activates at 0")
    }

    /// Whether `fork` is active at `height` on `network`.
    pub fn is_active(fork: SoftFork, network: Network, height: u32) -> bool {
        SoftFork::current(network, height) >= fork
    }

    /// The next fork to activate after `height`, if its height is known.
    pub fn next(network: Network, height: u32) -> Option<SoftFork> {
        SoftFork::activation_list(network)
            .range((Excluded(height), Unbounded))
            .map(|(_, fork)| *fork)
            .next()
    }

    /// The activation height for this fork on `network`, if known.
    pub fn activation_height(&self, network: Network) -> Option<u32> {
        SoftFork::activation_list(network)
            .iter()
            .find(|(_, fork)| fork == self)
            .map(|(height, _)| *height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bip34_is_active_at_its_own_height_and_above() {
        assert!(SoftFork::is_active(BIP34, Network::Mainnet, 227_931));
        assert!(SoftFork::is_active(BIP34, Network::Mainnet, 227_932));
    }

    #[test]
    fn bip34_is_not_active_just_below_its_height() {
        assert!(!SoftFork::is_active(BIP34, Network::Mainnet, 227_930));
    }

    #[test]
    fn segwit_is_the_current_fork_at_a_recent_height() {
        assert_eq!(SoftFork::current(Network::Mainnet, 700_000), SegWit);
    }

    #[test]
    fn genesis_is_current_at_height_zero() {
        assert_eq!(SoftFork::current(Network::Mainnet, 0), Genesis);
    }

    #[test]
    fn activation_height_round_trips_for_known_forks() {
        assert_eq!(BIP65.activation_height(Network::Mainnet), Some(388_381));
    }
}
