//! Contextual block acceptance: `accept()`, §4.6 step 1-8 (minus `connect`,
//! which is its own phase).

use bitcoin_chain::bip34;
use bitcoin_chain::block::Block;
use bitcoin_chain::parameters::SoftFork;

use crate::chain_state::ChainState;
use crate::error::BlockError;
use crate::settings::Settings;
use crate::subsidy;
use crate::transaction;

/// Contextual checks that need a [`ChainState`] and [`Settings`] beyond what
/// a block can check about itself.
///
/// `check_header`/`check_transactions` let a caller skip re-checking work
/// already done at `check()` time (e.g. during reorg replay of a block
/// that was `Checked` long ago).
#[tracing::instrument(skip(block, state, settings), fields(hash = %block.hash(), height = state.height()))]
pub fn accept(
    block: &Block,
    state: &dyn ChainState,
    settings: &Settings,
    check_header: bool,
    check_transactions: bool,
) -> Result<(), BlockError> {
    let hash = block.hash();
    let height = state.height();
    let forks = state.enabled_forks();

    if check_header {
        if block.header.bits.0 != state.work_required() {
            return Err(BlockError::InvalidDifficulty(hash));
        }
        if block.header.timestamp <= state.median_time_past() {
            return Err(BlockError::TimeNotAfterMedian(hash));
        }
    }

    if check_transactions {
        let block_time_or_mtp = if forks.contains(&SoftFork::CSV) {
            state.median_time_past()
        } else {
            block.header.timestamp
        };
        for tx in &block.transactions {
            if !transaction::is_final(tx, height, block_time_or_mtp) {
                return Err(BlockError::Transaction(crate::error::TransactionError::NotFinal));
            }
        }
    }

    if forks.contains(&SoftFork::BIP34) {
        let expected_height = height as u32;
        let coinbase_script = block
            .transactions
            .first()
            .and_then(|tx| tx.inputs.first())
            .map(|input| input.script.clone())
            .unwrap_or_default();
        if bip34::decode_height(&coinbase_script) != Some(expected_height) {
            return Err(BlockError::BadCoinbaseHeight(hash));
        }
    }

    if forks.contains(&SoftFork::SegWit) && block.is_segregated() && !block.is_valid_witness_commitment() {
        return Err(BlockError::BadWitnessCommitment(hash));
    }

    if block.is_forward_reference() {
        return Err(BlockError::ForwardReference(hash));
    }
    if block.is_internal_double_spend() {
        return Err(BlockError::InternalDoubleSpend(hash));
    }

    let fees = fees(block, state)?;
    let reward = subsidy::reward(height, fees, settings).map_err(BlockError::Subsidy)?;
    if block.claim() > reward {
        return Err(BlockError::BadCoinbaseClaim(hash));
    }

    const MAX_BLOCK_SIGOPS_COST: u64 = 80_000;
    let bip16 = forks.contains(&SoftFork::BIP34);
    let segwit = forks.contains(&SoftFork::SegWit);
    let weighted_sigops: u64 = block
        .transactions
        .iter()
        .skip(1)
        .map(|tx| transaction::weighted_sigop_cost(tx, state, bip16, segwit))
        .sum();
    if weighted_sigops > MAX_BLOCK_SIGOPS_COST {
        return Err(BlockError::TooManySigops(hash));
    }

    tracing::trace!(%hash, "block accepted");
    Ok(())
}

/// `fees = Σ(prior output values of non-coinbase inputs) - Σ(non-coinbase
/// output values)`. An underflow (inputs summing to less than outputs) is a
/// validation failure, surfaced as a zero-fee claim check that will reject
/// for exceeding the subsidy.
fn fees(block: &Block, state: &dyn ChainState) -> Result<u64, BlockError> {
    let hash = block.hash();
    let mut input_total: u64 = 0;
    let mut output_total: u64 = 0;
    for tx in block.transactions.iter().skip(1) {
        for input in &tx.inputs {
            let output = state
                .output_of(&input.previous_output)
                .ok_or(BlockError::BadCoinbaseClaim(hash))?;
            input_total = input_total.checked_add(output.value).ok_or(BlockError::BadCoinbaseClaim(hash))?;
        }
        for output in &tx.outputs {
            output_total = output_total.checked_add(output.value).ok_or(BlockError::BadCoinbaseClaim(hash))?;
        }
    }
    input_total.checked_sub(output_total).ok_or(BlockError::BadCoinbaseClaim(hash))
}
