//! The block validation core: the rules a block and its transactions must
//! satisfy to extend the chain, independent of networking, storage, or
//! script execution — each of which is an external collaborator this crate
//! only defines a trait for.

pub mod block;
pub mod chain_state;
pub mod error;
pub mod flush_lock;
pub mod settings;
pub mod subsidy;
pub mod transaction;

pub use block::{accept, check, connect, BlockState, ScriptFlags, ScriptVm};
pub use chain_state::ChainState;
pub use error::{BlockError, ConfigError, ScriptError, SubsidyError, TransactionError};
pub use flush_lock::{FlushLock, PathFlushLock};
pub use settings::Settings;
