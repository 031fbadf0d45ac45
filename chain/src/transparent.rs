//! Transparent (Bitcoin) transaction inputs and outputs.

use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::h256::H256;

/// A reference to a particular output of a previous transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct OutPoint {
    /// The transaction that contains the referenced output.
    pub hash: H256,
    /// Which output of that transaction is referenced; the first output is 0.
    pub index: u32,
}

impl OutPoint {
    /// The sentinel outpoint that marks a coinbase input: an all-zero hash
    /// and an index of `0xFFFFFFFF`.
    pub const fn null() -> OutPoint {
        OutPoint {
            hash: H256::ZERO,
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash == H256::ZERO && self.index == u32::MAX
    }

    pub const fn len() -> usize {
        36
    }
}

/// A transparent input to a transaction.
///
/// Coinbase-ness is not a separate variant: it is derived from
/// `previous_output` being the [`OutPoint::null`] sentinel, the way
/// bitcoin-core's `CTxIn` represents it.
///
/// `Input` doesn't derive `BitcoinSerialize`/`BitcoinDeserialize`: the
/// witness is segregated into its own section of the transaction's wire
/// encoding (BIP 141), not interleaved per-input, so `Transaction`
/// serializes each input's fields itself rather than delegating here.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Input {
    /// The previous output this input spends, or the coinbase sentinel.
    pub previous_output: OutPoint,
    /// The unlocking script (or, for a coinbase input, arbitrary miner data).
    pub script: Vec<u8>,
    /// The sequence number, used for relative locktime and opt-in RBF.
    pub sequence: u32,
    /// SegWit witness stack. Empty for non-witness transactions and for
    /// transactions predating BIP 141.
    pub witness: Vec<Vec<u8>>,
}

impl Input {
    pub fn is_coinbase(&self) -> bool {
        self.previous_output.is_null()
    }

    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }

    /// Length in bytes of the non-witness encoding of this input.
    pub fn non_witness_len(&self) -> usize {
        OutPoint::len() + crate::serialization::CompactSize::size(self.script.len()) + self.script.len() + 4
    }
}

/// A transparent output from a transaction.
#[derive(Clone, Debug, Eq, PartialEq, Hash, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Output {
    /// The output value, in satoshis.
    pub value: u64,
    /// The locking script defining how this output may be spent.
    pub script: Vec<u8>,
}

impl Output {
    /// Length in bytes of this output's encoding.
    pub fn len(&self) -> usize {
        8 + crate::serialization::CompactSize::size(self.script.len()) + self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
