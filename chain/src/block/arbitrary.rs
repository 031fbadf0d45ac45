//! Hand-written `Arbitrary` for [`Header`] and [`Block`]: both carry cache
//! fields (`Cached<H256>`, [`bitcoin_sync::UpgradeLock`]) that aren't
//! `Arbitrary` themselves, so their strategies build the structs via the
//! ordinary constructors instead of a derive.

use proptest::{collection::vec, prelude::*};

use crate::h256::H256;
use crate::merkle;
use crate::transaction::Transaction;
use crate::work::difficulty::CompactDifficulty;

use super::{Block, Header};

impl Arbitrary for Header {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (
            // interpreted as i32 by consumers, so stay within i32's range
            4i32..i32::MAX,
            any::<H256>(),
            any::<H256>(),
            any::<u32>(),
            any::<CompactDifficulty>(),
            any::<u32>(),
        )
            .prop_map(|(version, previous_block_hash, merkle_root, timestamp, bits, nonce)| {
                Header::new(version, previous_block_hash, merkle_root, timestamp, bits, nonce)
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Block {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (any::<Header>(), vec(any::<Transaction>(), 1..4))
            .prop_map(|(header, transactions)| Block::new(header, transactions))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// A strategy producing blocks whose header's `merkle_root` matches its
/// transaction list, since the unconstrained [`Arbitrary`] impl above does
/// not enforce that relationship.
pub fn block_with_valid_merkle_root() -> impl Strategy<Value = Block> {
    (any::<Header>(), vec(any::<Transaction>(), 1..4)).prop_map(|(header, transactions)| {
        let merkle_root = merkle::root(transactions.iter().map(Transaction::txid));
        let header = Header::new(
            header.version,
            header.previous_block_hash,
            merkle_root,
            header.timestamp,
            header.bits,
            header.nonce,
        );
        Block::new(header, transactions)
    })
}
