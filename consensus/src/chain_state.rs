//! The external chain-state collaborator `accept`/`connect` consult for
//! context a single block can't supply on its own.

use std::collections::BTreeSet;

use bitcoin_chain::parameters::SoftFork;
use bitcoin_chain::transparent::{OutPoint, Output};

/// Height, active soft forks, median time past, and a prior-output resolver
/// for the block currently being validated.
///
/// Implemented by the node's storage layer; this crate only consumes it.
pub trait ChainState {
    /// The height of the block being validated (its parent's height + 1).
    fn height(&self) -> u64;
    /// The soft forks active at `height()`.
    fn enabled_forks(&self) -> BTreeSet<SoftFork>;
    /// The median timestamp of the 11 blocks preceding this one.
    fn median_time_past(&self) -> u32;
    /// The output a prior transaction produced, if it's still unspent and
    /// known to the chain state.
    fn output_of(&self, outpoint: &OutPoint) -> Option<Output>;
    /// The compact target (`bits`) this block is expected to carry.
    fn work_required(&self) -> u32;
}

/// A fixed, in-memory `ChainState` for tests: no prior outputs, a static
/// height/MTP/fork set.
#[derive(Clone, Debug, Default)]
pub struct StaticChainState {
    pub height: u64,
    pub forks: BTreeSet<SoftFork>,
    pub median_time_past: u32,
    pub work_required: u32,
}

impl ChainState for StaticChainState {
    fn height(&self) -> u64 {
        self.height
    }

    fn enabled_forks(&self) -> BTreeSet<SoftFork> {
        self.forks.clone()
    }

    fn median_time_past(&self) -> u32 {
        self.median_time_past
    }

    fn output_of(&self, _outpoint: &OutPoint) -> Option<Output> {
        None
    }

    fn work_required(&self) -> u32 {
        self.work_required
    }
}
