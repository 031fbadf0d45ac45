//! Transaction-level checks: the per-transaction half of `check()` and
//! `accept()`.

use std::collections::HashSet;

use bitcoin_chain::script;
use bitcoin_chain::transaction::Transaction;

use crate::chain_state::ChainState;
use crate::error::TransactionError;
use crate::settings::Settings;

/// Context-free structural checks on a single transaction: nonempty
/// inputs/outputs, output values in range, no duplicate inputs, and (for a
/// coinbase transaction) a scriptSig length in `[2, 100]`.
pub fn check_transaction(tx: &Transaction, is_coinbase: bool, settings: &Settings) -> Result<(), TransactionError> {
    if tx.inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if tx.outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }

    let mut total: u64 = 0;
    for output in &tx.outputs {
        if output.value > settings.max_money {
            return Err(TransactionError::ValueOutOfRange);
        }
        total = total.checked_add(output.value).ok_or(TransactionError::ValueOverflow)?;
    }
    if total > settings.max_money {
        return Err(TransactionError::ValueOverflow);
    }

    if is_coinbase {
        let script_len = tx.inputs[0].script.len();
        if !(2..=100).contains(&script_len) {
            return Err(TransactionError::BadCoinbaseScriptLength);
        }
    } else {
        let mut seen = HashSet::new();
        for input in &tx.inputs {
            if !seen.insert(input.previous_output) {
                return Err(TransactionError::DuplicateInput);
            }
        }
    }

    Ok(())
}

/// Whether `tx` may be included in a block at `height`, given the block's
/// timestamp (or median time past, once BIP 113 is active).
///
/// A transaction with `locktime == 0` is always final. Otherwise, `locktime`
/// is interpreted as a height (when `< LOCKTIME_THRESHOLD`) or a Unix
/// timestamp, and must have already passed — unless every input's sequence
/// number opts out of locktime enforcement (`0xFFFFFFFF`).
pub fn is_final(tx: &Transaction, height: u64, block_time_or_mtp: u32) -> bool {
    const LOCKTIME_THRESHOLD: u32 = 500_000_000;

    if tx.locktime == 0 {
        return true;
    }
    if tx.inputs.iter().all(|input| input.sequence == 0xFFFFFFFF) {
        return true;
    }
    if tx.locktime < LOCKTIME_THRESHOLD {
        (tx.locktime as u64) < height
    } else {
        tx.locktime < block_time_or_mtp
    }
}

/// BIP 141 weighted sigop cost for `tx`'s inputs, given the chain state to
/// resolve prior outputs: legacy sigops (scriptSig plus, when `bip16` is
/// active, any P2SH redeem script) weighted ×4, plus witness sigops
/// (scanned from a P2WSH witness's redeem script) weighted ×1.
///
/// Returns the context-free count for a coinbase input (it has no prior
/// output to resolve) or when an input's prior output is unknown to `state`.
pub fn weighted_sigop_cost(tx: &Transaction, state: &dyn ChainState, bip16: bool, segwit: bool) -> u64 {
    let mut legacy = 0u64;
    let mut witness = 0u64;

    for output in &tx.outputs {
        legacy += script::count_sigops(&output.script);
    }

    for input in &tx.inputs {
        legacy += script::count_sigops(&input.script);

        let Some(prevout) = state.output_of(&input.previous_output) else {
            continue;
        };

        if bip16 && script::is_p2sh(&prevout.script) {
            if let Some(redeem_script) = script::p2sh_redeem_script(&input.script) {
                legacy += script::count_sigops(redeem_script);
            }
        }

        if segwit && input.witness.len() >= 2 && is_p2wsh(&prevout.script) {
            if let Some(redeem_script) = input.witness.last() {
                witness += script::count_sigops(redeem_script);
            }
        }
    }

    script::weighted_sigop_cost(legacy, witness)
}

/// Whether `script` is a standard pay-to-witness-script-hash output
/// (`OP_0 <32 bytes>`).
fn is_p2wsh(script: &[u8]) -> bool {
    script.len() == 34 && script[0] == 0x00 && script[1] == 0x20
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin_chain::transparent::{Input, OutPoint, Output};

    fn tx_with_locktime(locktime: u32, sequence: u32) -> Transaction {
        Transaction::new(
            1,
            vec![Input {
                previous_output: OutPoint { hash: bitcoin_chain::H256::from_bytes([1; 32]), index: 0 },
                script: vec![],
                sequence,
                witness: vec![],
            }],
            vec![Output { value: 1, script: vec![] }],
            locktime,
        )
    }

    #[test]
    fn zero_locktime_is_always_final() {
        assert!(is_final(&tx_with_locktime(0, 0), 100, 100));
    }

    #[test]
    fn max_sequence_opts_out_of_locktime() {
        assert!(is_final(&tx_with_locktime(1_000_000, 0xFFFFFFFF), 1, 1));
    }

    #[test]
    fn height_locktime_not_yet_reached_is_not_final() {
        assert!(!is_final(&tx_with_locktime(500, 0), 100, 100));
        assert!(is_final(&tx_with_locktime(500, 0), 600, 100));
    }

    #[test]
    fn empty_inputs_is_rejected() {
        let tx = Transaction::new(1, vec![], vec![Output { value: 1, script: vec![] }], 0);
        assert_eq!(
            check_transaction(&tx, false, &Settings::default()),
            Err(TransactionError::NoInputs)
        );
    }

    fn coinbase_tx_with_script_len(len: usize) -> Transaction {
        Transaction::new(
            1,
            vec![Input {
                previous_output: OutPoint::null(),
                script: vec![0u8; len],
                sequence: 0xFFFFFFFF,
                witness: vec![],
            }],
            vec![Output { value: 1, script: vec![] }],
            0,
        )
    }

    #[test]
    fn coinbase_script_length_one_is_rejected_length_two_is_accepted() {
        assert_eq!(
            check_transaction(&coinbase_tx_with_script_len(1), true, &Settings::default()),
            Err(TransactionError::BadCoinbaseScriptLength)
        );
        assert_eq!(
            check_transaction(&coinbase_tx_with_script_len(2), true, &Settings::default()),
            Ok(())
        );
    }

    #[test]
    fn duplicate_inputs_are_rejected() {
        let input = Input {
            previous_output: OutPoint { hash: bitcoin_chain::H256::from_bytes([2; 32]), index: 0 },
            script: vec![],
            sequence: 0,
            witness: vec![],
        };
        let tx = Transaction::new(1, vec![input.clone(), input], vec![Output { value: 1, script: vec![] }], 0);
        assert_eq!(
            check_transaction(&tx, false, &Settings::default()),
            Err(TransactionError::DuplicateInput)
        );
    }

    struct SingleOutputChainState(OutPoint, Output);

    impl ChainState for SingleOutputChainState {
        fn height(&self) -> u64 {
            0
        }
        fn enabled_forks(&self) -> std::collections::BTreeSet<bitcoin_chain::parameters::SoftFork> {
            Default::default()
        }
        fn median_time_past(&self) -> u32 {
            0
        }
        fn output_of(&self, outpoint: &OutPoint) -> Option<Output> {
            (outpoint == &self.0).then(|| self.1.clone())
        }
        fn work_required(&self) -> u32 {
            0
        }
    }

    #[test]
    fn p2sh_redeem_script_sigops_count_toward_the_weighted_cost_when_bip16_is_active() {
        let previous_output = OutPoint { hash: bitcoin_chain::H256::from_bytes([3; 32]), index: 0 };
        let mut p2sh_script = vec![0xa9, 0x14];
        p2sh_script.extend_from_slice(&[0u8; 20]);
        p2sh_script.push(0x87);

        let redeem_script = vec![0xae]; // bare OP_CHECKMULTISIG, 20 sigops
        let mut script_sig = vec![redeem_script.len() as u8];
        script_sig.extend_from_slice(&redeem_script);

        let tx = Transaction::new(
            1,
            vec![Input { previous_output, script: script_sig, sequence: 0, witness: vec![] }],
            vec![Output { value: 1, script: vec![] }],
            0,
        );
        let state = SingleOutputChainState(previous_output, Output { value: 1, script: p2sh_script });

        assert_eq!(weighted_sigop_cost(&tx, &state, true, false), 20 * 4);
        assert_eq!(weighted_sigop_cost(&tx, &state, false, false), 0);
    }
}
