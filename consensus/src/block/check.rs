//! Context-free block checks: `check()`, §4.6 step 1-8.

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use bitcoin_chain::block::{Block, MAX_BLOCK_WEIGHT};
use bitcoin_chain::work::difficulty::{pow_hash_order, CompactDifficulty};

use crate::error::BlockError;
use crate::settings::Settings;
use crate::transaction;

/// Ordered, first-failure-wins context-free validation of `block`.
#[tracing::instrument(skip(block, settings), fields(hash = %block.hash()))]
pub fn check(block: &Block, settings: &Settings) -> Result<(), BlockError> {
    let hash = block.hash();

    if block.base_size() as u64 > bitcoin_chain::block::MAX_BLOCK_BYTES || block.weight() > MAX_BLOCK_WEIGHT {
        return Err(BlockError::Oversize);
    }

    proof_of_work_is_valid(block, settings)?;
    timestamp_is_valid(block, settings)?;
    coinbase_structure_is_valid(block)?;

    for (index, tx) in block.transactions.iter().enumerate() {
        transaction::check_transaction(tx, index == 0, settings).map_err(BlockError::Transaction)?;
    }

    if !block.is_distinct_transaction_set() {
        return Err(BlockError::DuplicateTransaction(hash));
    }
    if !block.is_valid_merkle_root() {
        return Err(BlockError::BadMerkleRoot(hash));
    }

    const MAX_BLOCK_SIGOPS_COST: u64 = 80_000;
    if block.context_free_sigops() * 4 > MAX_BLOCK_SIGOPS_COST {
        return Err(BlockError::TooManySigops(hash));
    }

    tracing::trace!(%hash, "block passed context-free check");
    Ok(())
}

fn proof_of_work_is_valid(block: &Block, settings: &Settings) -> Result<(), BlockError> {
    let hash = block.hash();
    let target = block.header.bits.to_expanded();
    let limit = CompactDifficulty(settings.proof_of_work_limit).to_expanded();

    if target.is_zero() || target.cmp(&limit) == Ordering::Greater {
        return Err(BlockError::InvalidDifficulty(hash));
    }
    if pow_hash_order(hash, target) != Ordering::Less {
        return Err(BlockError::InvalidProofOfWork(hash));
    }
    Ok(())
}

fn timestamp_is_valid(block: &Block, settings: &Settings) -> Result<(), BlockError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch")
        .as_secs() as u32;
    let limit = now.saturating_add(settings.timestamp_limit_seconds);
    if block.header.timestamp > limit {
        return Err(BlockError::TimeTooFarInFuture(block.hash()));
    }
    Ok(())
}

fn coinbase_structure_is_valid(block: &Block) -> Result<(), BlockError> {
    let hash = block.hash();
    if block.transactions.is_empty() {
        return Err(BlockError::NoTransactions(hash));
    }
    if !block.transactions[0].is_coinbase() {
        return Err(BlockError::CoinbasePosition(hash));
    }
    if block.is_extra_coinbases() {
        return Err(BlockError::ExtraCoinbase(hash));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin_chain::bip34;
    use bitcoin_chain::h256::H256;
    use bitcoin_chain::transaction::Transaction;
    use bitcoin_chain::transparent::{Input, OutPoint, Output};

    fn coinbase_only_block(timestamp: u32) -> Block {
        let coinbase = Transaction::new(
            1,
            vec![Input {
                previous_output: OutPoint::null(),
                script: bip34::encode_height(1),
                sequence: 0xFFFFFFFF,
                witness: vec![],
            }],
            vec![Output { value: 5_000_000_000, script: vec![] }],
            0,
        );
        let merkle_root = bitcoin_chain::merkle::root(vec![coinbase.txid()]);
        let header = bitcoin_chain::block::Header::new(
            1,
            H256::ZERO,
            merkle_root,
            timestamp,
            CompactDifficulty(0x207fffff),
            0,
        );
        Block::new(header, vec![coinbase])
    }

    #[test]
    fn far_future_timestamp_is_rejected() {
        let block = coinbase_only_block(u32::MAX);
        let settings = Settings::default();
        assert!(matches!(
            timestamp_is_valid(&block, &settings),
            Err(BlockError::TimeTooFarInFuture(_))
        ));
    }

    #[test]
    fn distinct_transaction_set_check_passes_for_single_coinbase() {
        let block = coinbase_only_block(1_600_000_000);
        assert!(block.is_distinct_transaction_set());
    }

    #[test]
    fn a_zero_input_transaction_fails_check_with_a_transaction_structure_error() {
        use bitcoin_chain::transparent::Output;

        let mut block = coinbase_only_block(1_600_000_000);
        let empty_input_tx = Transaction::new(1, vec![], vec![Output { value: 1, script: vec![] }], 0);
        block.transactions.push(empty_input_tx);

        assert!(matches!(
            check(&block, &Settings::default()),
            Err(BlockError::Transaction(crate::error::TransactionError::NoInputs))
        ));
    }
}
