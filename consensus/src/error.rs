//! The error taxonomy consulted across the validation pipeline: one
//! `thiserror`-derived enum per propagation boundary, mirroring
//! `bitcoin_chain::serialization::SerializationError`'s io/Parse split.

use bitcoin_chain::H256;
use thiserror::Error;

/// Failures `check`/`accept`/`connect` can report against an entire block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("block exceeds the maximum base size or weight")]
    Oversize,
    #[error("block {0:?} proof-of-work hash does not meet its target")]
    InvalidProofOfWork(H256),
    #[error("block {0:?} difficulty target is out of the allowed range")]
    InvalidDifficulty(H256),
    #[error("block {0:?} timestamp is too far in the future")]
    TimeTooFarInFuture(H256),
    #[error("block {0:?} timestamp is not greater than the median time past")]
    TimeNotAfterMedian(H256),
    #[error("block {0:?} has no transactions")]
    NoTransactions(H256),
    #[error("block {0:?}'s first transaction is not coinbase")]
    CoinbasePosition(H256),
    #[error("block {0:?} contains more than one coinbase transaction")]
    ExtraCoinbase(H256),
    #[error("block {0:?} contains duplicate transactions")]
    DuplicateTransaction(H256),
    #[error("block {0:?}'s header merkle_root does not match its transactions")]
    BadMerkleRoot(H256),
    #[error("segregated block {0:?} has a missing or invalid witness commitment")]
    BadWitnessCommitment(H256),
    #[error("block {0:?} contains a forward reference to a later transaction's output")]
    ForwardReference(H256),
    #[error("block {0:?} spends the same output twice")]
    InternalDoubleSpend(H256),
    #[error("block {0:?}'s context-free sigop count exceeds the per-block limit")]
    TooManySigops(H256),
    #[error("block {0:?}'s coinbase script does not encode the expected BIP 34 height")]
    BadCoinbaseHeight(H256),
    #[error("block {0:?}'s coinbase claims more than subsidy plus fees")]
    BadCoinbaseClaim(H256),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Subsidy(#[from] SubsidyError),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Failures reported against an individual transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction has no inputs")]
    NoInputs,
    #[error("transaction has no outputs")]
    NoOutputs,
    #[error("transaction contains an output value outside [0, max_money]")]
    ValueOutOfRange,
    #[error("transaction's output values overflow when summed")]
    ValueOverflow,
    #[error("coinbase script length is not in [2, 100] bytes")]
    BadCoinbaseScriptLength,
    #[error("transaction spends the same outpoint more than once")]
    DuplicateInput,
    #[error("transaction is not final at the given height/time")]
    NotFinal,
}

/// Failures computing or validating a coinbase subsidy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsidyError {
    #[error("block has no coinbase transaction to compute a subsidy for")]
    NoCoinbase,
    #[error("subsidy computation overflowed")]
    Overflow,
}

/// Failures in the host-supplied configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("subsidy_interval must be nonzero")]
    ZeroSubsidyInterval,
    #[error("initial_block_subsidy_satoshi exceeds max_money")]
    SubsidyExceedsMaxMoney,
}

/// Opaque failure delegated from the external script VM during `connect`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("script verification failed for input {input_index} of transaction {txid:?}: {reason}")]
pub struct ScriptError {
    pub txid: H256,
    pub input_index: usize,
    pub reason: String,
}
