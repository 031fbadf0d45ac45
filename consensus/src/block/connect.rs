//! Script verification: `connect()`, the final pipeline phase.

use bitcoin_chain::block::Block;
use bitcoin_chain::parameters::SoftFork;
use bitcoin_chain::transparent::Output;

use crate::chain_state::ChainState;
use crate::error::{BlockError, ScriptError};

/// Fork-derived flags a script VM needs to pick the right rule set for an
/// input (e.g. whether `OP_CHECKSEQUENCEVERIFY` is a no-op or enforced).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptFlags {
    pub bip16: bool,
    pub bip65: bool,
    pub bip66: bool,
    pub csv: bool,
    pub segwit: bool,
}

impl ScriptFlags {
    pub fn from_forks(forks: &std::collections::BTreeSet<SoftFork>) -> ScriptFlags {
        ScriptFlags {
            bip16: forks.contains(&SoftFork::BIP34) || forks.contains(&SoftFork::Genesis),
            bip65: forks.contains(&SoftFork::BIP65),
            bip66: forks.contains(&SoftFork::BIP66),
            csv: forks.contains(&SoftFork::CSV),
            segwit: forks.contains(&SoftFork::SegWit),
        }
    }
}

/// The script-verification seam `connect` delegates every non-coinbase
/// input to. Implemented by the embedding node; this crate only defines the
/// interface.
pub trait ScriptVm {
    fn verify_input(&self, prevout: &Output, flags: ScriptFlags) -> Result<(), String>;
}

/// Verifies every non-coinbase input's script against `vm`, in order,
/// returning the first failure.
#[tracing::instrument(skip(block, state, vm), fields(hash = %block.hash()))]
pub fn connect(block: &Block, state: &dyn ChainState, vm: &dyn ScriptVm) -> Result<(), BlockError> {
    let hash = block.hash();
    let flags = ScriptFlags::from_forks(&state.enabled_forks());

    for tx in block.transactions.iter().skip(1) {
        let txid = tx.txid();
        for (input_index, input) in tx.inputs.iter().enumerate() {
            let prevout = state.output_of(&input.previous_output).ok_or_else(|| {
                BlockError::Script(ScriptError {
                    txid,
                    input_index,
                    reason: "referenced output not found".to_string(),
                })
            })?;
            vm.verify_input(&prevout, flags).map_err(|reason| {
                BlockError::Script(ScriptError { txid, input_index, reason })
            })?;
        }
    }
    tracing::trace!(%hash, "block connected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysAccepts;
    impl ScriptVm for AlwaysAccepts {
        fn verify_input(&self, _prevout: &Output, _flags: ScriptFlags) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn flags_reflect_active_forks() {
        let mut forks = std::collections::BTreeSet::new();
        forks.insert(SoftFork::SegWit);
        forks.insert(SoftFork::CSV);
        let flags = ScriptFlags::from_forks(&forks);
        assert!(flags.segwit);
        assert!(flags.csv);
        assert!(!flags.bip65);
    }
}
