//! Blocks: a header plus an ordered transaction list, and the derived
//! quantities computed from that list.

mod header;

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;

pub use header::Header;

use std::io;

use bitcoin_sync::UpgradeLock;

use crate::bip34;
use crate::h256::H256;
use crate::merkle;
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, CompactSize, SerializationError};
use crate::transaction::Transaction;

/// The maximum serialized size of a block, in bytes (base, non-witness size).
pub const MAX_BLOCK_BYTES: u64 = 1_000_000;

/// The maximum block weight, in BIP 141 weight units.
pub const MAX_BLOCK_WEIGHT: u64 = 4_000_000;

#[derive(Clone, Default)]
struct DerivedQuantities {
    total_inputs: usize,
    non_coinbase_inputs: usize,
    base_size: usize,
    total_size: usize,
    segregated: bool,
}

/// A Bitcoin block: a header plus its ordered transaction list.
///
/// Derived quantities (`total_inputs`, `base_size`, ...) are computed lazily
/// and memoized under a single [`UpgradeLock`], matching the header's own
/// opportunistic hash cache: cheap to construct, recomputed at most once per
/// instance, never shared across a clone.
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    derived: UpgradeLock<DerivedQuantities>,
}

impl Clone for Block {
    fn clone(&self) -> Block {
        Block::new(self.header, self.transactions.clone())
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("header", &self.header)
            .field("transactions", &self.transactions)
            .finish()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl Eq for Block {}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Block {
        Block {
            header,
            transactions,
            derived: UpgradeLock::new(),
        }
    }

    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// The block height reported by the coinbase script, per BIP 34, if one
    /// is cached on the header or parseable from the coinbase input.
    pub fn coinbase_height(&self) -> Option<u32> {
        if let Some(height) = self.header.reported_height() {
            return Some(height as u32);
        }
        self.coinbase()
            .and_then(|tx| tx.inputs.first())
            .and_then(|input| bip34::decode_height(&input.script))
    }

    /// Whether any transaction block-wide carries a nonempty witness.
    pub fn is_segregated(&self) -> bool {
        self.derived().segregated
    }

    pub fn total_inputs(&self) -> usize {
        self.derived().total_inputs
    }

    pub fn non_coinbase_inputs(&self) -> usize {
        self.derived().non_coinbase_inputs
    }

    /// Non-witness serialized length, in bytes.
    pub fn base_size(&self) -> usize {
        self.derived().base_size
    }

    /// Witness serialized length, in bytes (equal to `base_size` when the
    /// block has no segregated witness data).
    pub fn total_size(&self) -> usize {
        self.derived().total_size
    }

    /// `weight = 3 * base_size + total_size` (BIP 141 weight units).
    pub fn weight(&self) -> u64 {
        3 * self.base_size() as u64 + self.total_size() as u64
    }

    fn derived(&self) -> DerivedQuantities {
        self.derived.get_or_init(|| {
            tracing::trace!("block derived-quantities cache miss, recomputing");
            let total_inputs = self.transactions.iter().map(|tx| tx.inputs.len()).sum();
            let non_coinbase_inputs = self
                .transactions
                .iter()
                .skip(1)
                .map(|tx| tx.inputs.len())
                .sum();
            let segregated = self.transactions.iter().any(Transaction::has_witness);
            DerivedQuantities {
                total_inputs,
                non_coinbase_inputs,
                base_size: self.serialized_size(false),
                total_size: self.serialized_size(true),
                segregated,
            }
        })
    }

    /// Clears every input's witness in place and invalidates the derived
    /// cache, so a subsequent query recomputes `segregated`/`total_size`
    /// (and the other derived quantities, which don't actually change).
    ///
    /// Does not touch the header, so the block hash is unaffected.
    pub fn strip_witness(&mut self) {
        for tx in self.transactions.iter_mut() {
            for input in tx.inputs.iter_mut() {
                input.witness.clear();
            }
        }
        self.derived.invalidate();
    }

    /// The ordered sequence of transaction ids (`witness = false`) or
    /// witness transaction ids (`witness = true`).
    pub fn to_hashes(&self, witness: bool) -> Vec<H256> {
        self.transactions
            .iter()
            .map(|tx| if witness { tx.wtxid() } else { tx.txid() })
            .collect()
    }

    pub fn generate_merkle_root(&self, witness: bool) -> H256 {
        merkle::root(self.to_hashes(witness))
    }

    pub fn is_valid_merkle_root(&self) -> bool {
        self.header.merkle_root == self.generate_merkle_root(false)
    }

    /// Whether any transaction after the first is also coinbase.
    pub fn is_extra_coinbases(&self) -> bool {
        self.transactions.iter().skip(1).any(Transaction::is_coinbase)
    }

    /// Whether every transaction's txid is unique within the block.
    pub fn is_distinct_transaction_set(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.transactions.iter().all(|tx| seen.insert(tx.txid()))
    }

    /// Whether any non-coinbase input spends an output produced by a
    /// transaction later in this same block.
    pub fn is_forward_reference(&self) -> bool {
        let txids: Vec<H256> = self.transactions.iter().map(Transaction::txid).collect();
        for (index, tx) in self.transactions.iter().enumerate().skip(1) {
            for input in &tx.inputs {
                if let Some(referenced) = txids.iter().position(|txid| *txid == input.previous_output.hash) {
                    if referenced > index {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Whether the same (txid, index) output is spent by more than one
    /// input within this block.
    pub fn is_internal_double_spend(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for tx in self.transactions.iter().skip(1) {
            for input in &tx.inputs {
                if !seen.insert(input.previous_output) {
                    return true;
                }
            }
        }
        false
    }

    /// The sum of the coinbase transaction's output values.
    pub fn claim(&self) -> u64 {
        self.coinbase()
            .map(|tx| tx.outputs.iter().map(|output| output.value).sum())
            .unwrap_or(0)
    }

    /// The context-free sigop count across every transaction, unweighted.
    pub fn context_free_sigops(&self) -> u64 {
        self.transactions.iter().map(Transaction::context_free_sigops).sum()
    }

    /// Whether the coinbase's witness commitment output matches the block's
    /// witness Merkle root and witness reserved value.
    ///
    /// Trivially valid (nothing to check) when the block carries no witness
    /// data at all.
    pub fn is_valid_witness_commitment(&self) -> bool {
        if !self.is_segregated() {
            return true;
        }
        let Some(coinbase) = self.coinbase() else {
            return false;
        };
        let Some(reserved) = coinbase
            .inputs
            .first()
            .and_then(|input| input.witness.first())
            .and_then(|value| <&[u8; 32]>::try_from(value.as_slice()).ok().copied())
        else {
            return false;
        };
        let commitment = coinbase
            .outputs
            .iter()
            .rev()
            .find_map(|output| merkle::parse_witness_commitment(&output.script));
        match commitment {
            Some(commitment) => {
                let witness_merkle_root = self.generate_merkle_root(true);
                merkle::verify_witness_commitment(commitment, witness_merkle_root, &reserved)
            }
            None => false,
        }
    }

    /// Serialized length, in bytes, of the chosen encoding.
    pub fn serialized_size(&self, witness: bool) -> usize {
        self.bitcoin_serialize_to_vec(witness)
            .expect("writing to a Vec is infallible")
            .len()
    }

    fn bitcoin_serialize_to_vec(&self, witness: bool) -> std::result::Result<Vec<u8>, io::Error> {
        let mut out = Vec::new();
        self.header.bitcoin_serialize(&mut out)?;
        CompactSize::from(self.transactions.len()).bitcoin_serialize(&mut out)?;
        for tx in &self.transactions {
            tx.write_to(witness, &mut out)?;
        }
        Ok(out)
    }

    /// Deserializes a block from `reader`, caching the header's hash from
    /// the 80 bytes it reads.
    pub fn read_from<R: io::Read>(mut reader: R) -> std::result::Result<Block, SerializationError> {
        let header = Header::deserialize_with_hash(&mut reader)?;
        let tx_count = CompactSize::bitcoin_deserialize(&mut reader)?;
        if tx_count.value() > MAX_BLOCK_BYTES / (36 * 4) {
            return Err(SerializationError::Parse(
                "block contained too many transactions for each to have at least one input",
            ));
        }
        let mut transactions = Vec::with_capacity(tx_count.value() as usize);
        for _ in 0..tx_count.value() {
            transactions.push(Transaction::read_from(true, &mut reader)?);
        }
        Ok(Block::new(header, transactions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transparent::{Input, OutPoint, Output};
    use crate::work::difficulty::CompactDifficulty;

    fn coinbase_tx(reward: u64) -> Transaction {
        Transaction::new(
            1,
            vec![Input {
                previous_output: OutPoint::null(),
                script: bip34::encode_height(1),
                sequence: 0xFFFFFFFF,
                witness: Vec::new(),
            }],
            vec![Output { value: reward, script: vec![] }],
            0,
        )
    }

    fn sample_block(reward: u64) -> Block {
        let transactions = vec![coinbase_tx(reward)];
        let header = Header::new(
            1,
            H256::ZERO,
            crate::merkle::root(transactions.iter().map(Transaction::txid)),
            1_231_006_506,
            CompactDifficulty(0x1d00ffff),
            0,
        );
        Block::new(header, transactions)
    }

    #[test]
    fn single_coinbase_block_has_valid_merkle_root() {
        let block = sample_block(5_000_000_000);
        assert!(block.is_valid_merkle_root());
    }

    #[test]
    fn single_coinbase_block_is_not_extra_coinbases() {
        assert!(!sample_block(1).is_extra_coinbases());
    }

    #[test]
    fn coinbase_height_parses_from_the_script() {
        assert_eq!(sample_block(1).coinbase_height(), Some(1));
    }

    #[test]
    fn claim_sums_coinbase_outputs() {
        assert_eq!(sample_block(5_000_000_000).claim(), 5_000_000_000);
    }

    #[test]
    fn non_segregated_block_trivially_has_a_valid_witness_commitment() {
        assert!(sample_block(1).is_valid_witness_commitment());
    }

    #[test]
    fn weight_equals_three_times_base_plus_total_when_no_witness() {
        let block = sample_block(1);
        assert_eq!(block.weight(), 3 * block.base_size() as u64 + block.total_size() as u64);
        assert_eq!(block.base_size(), block.total_size());
    }

    #[test]
    fn strip_witness_does_not_change_block_hash() {
        let mut block = sample_block(1);
        let hash_before = block.hash();
        block.strip_witness();
        assert_eq!(block.hash(), hash_before);
    }

    #[test]
    fn round_trips_through_serialize_and_read_from() {
        let block = sample_block(42);
        let bytes = block.bitcoin_serialize_to_vec(true).unwrap();
        let reparsed = Block::read_from(&bytes[..]).unwrap();
        assert_eq!(reparsed.header, block.header);
        assert_eq!(reparsed.transactions, block.transactions);
    }

    #[test]
    fn stripping_witness_preserves_hash_and_base_size_but_changes_total_size_and_segregated() {
        let mut coinbase = coinbase_tx(1);
        coinbase.inputs[0].witness = vec![vec![0u8; 32]];
        let header = Header::new(
            1,
            H256::ZERO,
            crate::merkle::root(std::iter::once(coinbase.txid())),
            1_231_006_506,
            CompactDifficulty(0x1d00ffff),
            0,
        );
        let mut block = Block::new(header, vec![coinbase]);
        assert!(block.is_segregated());

        let hash_before = block.hash();
        let base_size_before = block.base_size();
        let total_size_before = block.total_size();

        block.strip_witness();

        assert_eq!(block.hash(), hash_before);
        assert_eq!(block.base_size(), base_size_before);
        assert_ne!(block.total_size(), total_size_before);
        assert!(!block.is_segregated());
    }

    #[test]
    fn spending_a_same_block_transaction_is_a_forward_reference_only_when_it_comes_later() {
        let tx_a = Transaction::new(1, vec![Input {
            previous_output: OutPoint { hash: H256::from_bytes([9; 32]), index: 0 },
            script: vec![],
            sequence: 0,
            witness: vec![],
        }], vec![Output { value: 1, script: vec![] }], 0);
        let tx_b = Transaction::new(1, vec![Input {
            previous_output: OutPoint { hash: tx_a.txid(), index: 0 },
            script: vec![],
            sequence: 0,
            witness: vec![],
        }], vec![Output { value: 1, script: vec![] }], 0);

        let ordered = Block::new(
            Header::new(1, H256::ZERO, H256::ZERO, 0, CompactDifficulty(0x1d00ffff), 0),
            vec![coinbase_tx(1), tx_a.clone(), tx_b.clone()],
        );
        assert!(!ordered.is_forward_reference());

        let swapped = Block::new(
            Header::new(1, H256::ZERO, H256::ZERO, 0, CompactDifficulty(0x1d00ffff), 0),
            vec![coinbase_tx(1), tx_b, tx_a],
        );
        assert!(swapped.is_forward_reference());
    }

    #[test]
    fn mainnet_genesis_block_decodes_to_its_known_hash_and_merkle_root() {
        let bytes = bitcoin_test_support::mainnet_genesis_block_bytes();
        let block = Block::read_from(&bytes[..]).unwrap();

        assert_eq!(
            block.hash().to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
        assert_eq!(
            block.header.merkle_root.to_string(),
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
        assert_eq!(block.claim(), 5_000_000_000);
    }
}
