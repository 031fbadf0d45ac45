//! The three-phase block validation pipeline: `check` (context-free),
//! `accept` (needs chain state), `connect` (script verification).
//!
//! A [`Block`] value itself never tracks which phase it has passed —
//! callers thread a [`BlockState`] alongside it explicitly.

mod accept;
mod check;
mod connect;

pub use accept::accept;
pub use check::check;
pub use connect::{connect, ScriptFlags, ScriptVm};

use bitcoin_chain::H256;

use crate::error::BlockError;

/// Where a block sits in the `check -> accept -> connect` pipeline, as
/// tracked by a caller (this crate's functions are stateless and take no
/// part in holding it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// Not yet validated.
    Received,
    /// Passed context-free `check()`.
    Checked,
    /// Passed `accept()` against chain state.
    Accepted,
    /// Passed `connect()` script verification.
    Connected,
    /// Failed some phase; the hash and reason are preserved for diagnostics.
    Rejected(H256, BlockError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_state::StaticChainState;
    use crate::settings::Settings;
    use bitcoin_chain::bip34;
    use bitcoin_chain::block::{Block, Header};
    use bitcoin_chain::h256::H256 as Hash;
    use bitcoin_chain::transaction::Transaction;
    use bitcoin_chain::transparent::{Input, OutPoint, Output};
    use bitcoin_chain::work::difficulty::CompactDifficulty;

    fn coinbase_only_block(height: u32) -> Block {
        let coinbase = Transaction::new(
            1,
            vec![Input {
                previous_output: OutPoint::null(),
                script: bip34::encode_height(height),
                sequence: 0xFFFFFFFF,
                witness: vec![],
            }],
            vec![Output { value: 5_000_000_000, script: vec![] }],
            0,
        );
        let merkle_root = bitcoin_chain::merkle::root(vec![coinbase.txid()]);
        let header = Header::new(
            1,
            Hash::ZERO,
            merkle_root,
            1_600_000_000,
            CompactDifficulty(0x207fffff),
            0,
        );
        Block::new(header, vec![coinbase])
    }

    #[test]
    fn accept_passes_for_a_well_formed_coinbase_only_block_at_the_right_height() {
        let block = coinbase_only_block(5);
        let settings = Settings::default();
        let state = StaticChainState {
            height: 5,
            forks: Default::default(),
            median_time_past: 1_500_000_000,
            work_required: 0x207fffff,
        };
        assert!(accept(&block, &state, &settings, true, true).is_ok());
    }

    #[test]
    fn block_state_rejected_carries_the_failing_hash_and_error() {
        let block = coinbase_only_block(5);
        let state = BlockState::Rejected(block.hash(), BlockError::Oversize);
        assert!(matches!(state, BlockState::Rejected(_, BlockError::Oversize)));
    }

    #[test]
    fn witness_data_without_a_commitment_is_rejected_once_segwit_is_active() {
        let mut block = coinbase_only_block(5);
        let spend = Transaction::new(
            1,
            vec![Input {
                previous_output: OutPoint { hash: block.transactions[0].txid(), index: 0 },
                script: vec![],
                sequence: 0xFFFFFFFF,
                witness: vec![vec![1, 2, 3]],
            }],
            vec![Output { value: 1, script: vec![] }],
            0,
        );
        block.transactions.push(spend);
        assert!(block.is_segregated());
        assert!(!block.is_valid_witness_commitment());

        let settings = Settings::default();
        let state = StaticChainState {
            height: 5,
            forks: [bitcoin_chain::parameters::SoftFork::SegWit].into_iter().collect(),
            median_time_past: 1_500_000_000,
            work_required: 0x207fffff,
        };
        assert!(matches!(
            accept(&block, &state, &settings, true, true),
            Err(BlockError::BadWitnessCommitment(_))
        ));
    }
}
