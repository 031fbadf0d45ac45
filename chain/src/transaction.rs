//! Transactions: inputs, outputs, identity hashing, and sigop counting.

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;

use std::io;

use crate::cached::Cached;
use crate::h256::{sha256d, H256};
use crate::script;
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, CompactSize, SerializationError};
use crate::transparent::{Input, OutPoint, Output};

type Result<T> = std::result::Result<T, SerializationError>;

/// The SegWit marker byte (always `0x00`, immediately after the version).
const SEGWIT_MARKER: u8 = 0x00;
/// The SegWit flag byte (currently always `0x01`).
const SEGWIT_FLAG: u8 = 0x01;

/// A Bitcoin transaction.
///
/// Has two identities: `txid`, over the non-witness encoding, and `wtxid`,
/// over the witness encoding (BIP 141). Both are cached on first
/// computation, mirroring the header's hash cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub locktime: u32,
    txid: Cached<H256>,
    wtxid: Cached<H256>,
}

impl Transaction {
    pub fn new(version: i32, inputs: Vec<Input>, outputs: Vec<Output>, locktime: u32) -> Transaction {
        Transaction {
            version,
            inputs,
            outputs,
            locktime,
            txid: Cached::empty(),
            wtxid: Cached::empty(),
        }
    }

    /// Whether any input carries a nonempty witness.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(Input::has_witness)
    }

    /// A transaction is coinbase iff it has exactly one input and that
    /// input's previous output is the null sentinel.
    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [single] => single.is_coinbase(),
            _ => false,
        }
    }

    /// The transaction id: double-SHA256 of the non-witness encoding.
    pub fn txid(&self) -> H256 {
        if let Some(hash) = self.txid.value() {
            tracing::trace!("txid cache hit");
            return hash;
        }
        tracing::trace!("txid cache miss, recomputing");
        sha256d(&self.bitcoin_serialize_to_vec(false).expect("writing to a Vec is infallible"))
    }

    /// The witness transaction id: double-SHA256 of the witness encoding.
    ///
    /// By convention, a coinbase transaction's wtxid is the all-zero hash
    /// when used as a witness Merkle leaf, since the coinbase's own witness
    /// commits to everyone else's.
    pub fn wtxid(&self) -> H256 {
        if self.is_coinbase() {
            return H256::ZERO;
        }
        if let Some(hash) = self.wtxid.value() {
            tracing::trace!("wtxid cache hit");
            return hash;
        }
        if !self.has_witness() {
            return self.txid();
        }
        tracing::trace!("wtxid cache miss, recomputing");
        sha256d(&self.bitcoin_serialize_to_vec(true).expect("writing to a Vec is infallible"))
    }

    /// Serialized length, in bytes, of the chosen encoding.
    pub fn serialized_size(&self, witness: bool) -> usize {
        self.bitcoin_serialize_to_vec(witness)
            .expect("writing to a Vec is infallible")
            .len()
    }

    fn bitcoin_serialize_to_vec(&self, witness: bool) -> std::result::Result<Vec<u8>, io::Error> {
        let mut out = Vec::new();
        self.serialize_as(witness, &mut out)?;
        Ok(out)
    }

    fn serialize_as<W: io::Write>(&self, witness: bool, mut writer: W) -> std::result::Result<(), io::Error> {
        self.version.bitcoin_serialize(&mut writer)?;
        let write_witness = witness && self.has_witness();
        if write_witness {
            writer.write_all(&[SEGWIT_MARKER, SEGWIT_FLAG])?;
        }
        CompactSize::from(self.inputs.len()).bitcoin_serialize(&mut writer)?;
        for input in &self.inputs {
            write_input(input, &mut writer)?;
        }
        CompactSize::from(self.outputs.len()).bitcoin_serialize(&mut writer)?;
        self.outputs.bitcoin_serialize(&mut writer)?;
        if write_witness {
            for input in &self.inputs {
                input.witness.bitcoin_serialize(&mut writer)?;
            }
        }
        self.locktime.bitcoin_serialize(&mut writer)?;
        Ok(())
    }

    /// Serializes the non-witness or witness encoding to `writer`.
    pub fn write_to<W: io::Write>(&self, witness: bool, writer: W) -> std::result::Result<(), io::Error> {
        self.serialize_as(witness, writer)
    }

    /// Reads a transaction, tolerating both the witness and non-witness
    /// encodings regardless of `witness`'s value, per the `factory`
    /// semantics documented for block assembly: `witness = true` accepts
    /// either form; `witness = false` rejects the marker/flag bytes outright.
    pub fn read_from<R: io::Read>(witness: bool, mut reader: R) -> Result<Transaction> {
        let version = i32::bitcoin_deserialize(&mut reader)?;
        let next = u8::bitcoin_deserialize(&mut reader)?;

        if next == SEGWIT_MARKER {
            let flag = u8::bitcoin_deserialize(&mut reader)?;
            if flag == SEGWIT_FLAG {
                if !witness {
                    return Err(SerializationError::Parse(
                        "SegWit marker/flag present but witness decoding was disabled",
                    ));
                }
                return Transaction::read_body(version, true, &mut reader);
            }
            // The 0x00 we consumed was itself a CompactSize of 0: a
            // zero-input transaction. `flag` is the first byte of the
            // following CompactSize (the output count).
            let output_count = CompactSize::deserialize_with_first_byte(flag, &mut reader)?;
            let outputs = read_outputs(output_count, &mut reader)?;
            let locktime = u32::bitcoin_deserialize(&mut reader)?;
            return Ok(Transaction::new(version, Vec::new(), outputs, locktime));
        }

        Transaction::read_body_with_input_count_first_byte(version, next, &mut reader)
    }

    fn read_body<R: io::Read>(version: i32, with_witness: bool, mut reader: R) -> Result<Transaction> {
        let input_count = CompactSize::bitcoin_deserialize(&mut reader)?;
        Transaction::read_rest(version, with_witness, input_count, &mut reader)
    }

    fn read_body_with_input_count_first_byte<R: io::Read>(
        version: i32,
        first_byte: u8,
        mut reader: R,
    ) -> Result<Transaction> {
        let input_count = CompactSize::deserialize_with_first_byte(first_byte, &mut reader)?;
        Transaction::read_rest(version, false, input_count, &mut reader)
    }

    fn read_rest<R: io::Read>(
        version: i32,
        with_witness: bool,
        input_count: CompactSize,
        mut reader: R,
    ) -> Result<Transaction> {
        let mut inputs = read_inputs(input_count, &mut reader)?;
        let output_count = CompactSize::bitcoin_deserialize(&mut reader)?;
        let outputs = read_outputs(output_count, &mut reader)?;
        if with_witness {
            for input in inputs.iter_mut() {
                input.witness = <Vec<Vec<u8>>>::bitcoin_deserialize(&mut reader)?;
            }
        }
        let locktime = u32::bitcoin_deserialize(&mut reader)?;
        Ok(Transaction::new(version, inputs, outputs, locktime))
    }

    /// The context-free sigop count: legacy sigops in every input's script
    /// and every output's script, with no witness or P2SH scaling.
    pub fn context_free_sigops(&self) -> u64 {
        let mut count = 0;
        for input in &self.inputs {
            count += script::count_sigops(&input.script);
        }
        for output in &self.outputs {
            count += script::count_sigops(&output.script);
        }
        count
    }
}

fn write_input<W: io::Write>(input: &Input, mut writer: W) -> std::result::Result<(), io::Error> {
    input.previous_output.bitcoin_serialize(&mut writer)?;
    input.script.bitcoin_serialize(&mut writer)?;
    input.sequence.bitcoin_serialize(&mut writer)?;
    Ok(())
}

fn read_input<R: io::Read>(mut reader: R) -> Result<Input> {
    let previous_output = OutPoint::bitcoin_deserialize(&mut reader)?;
    let script = Vec::<u8>::bitcoin_deserialize(&mut reader)?;
    let sequence = u32::bitcoin_deserialize(&mut reader)?;
    Ok(Input {
        previous_output,
        script,
        sequence,
        witness: Vec::new(),
    })
}

fn read_inputs<R: io::Read>(count: CompactSize, mut reader: R) -> Result<Vec<Input>> {
    let mut inputs = Vec::with_capacity(std::cmp::min(count.value() as usize, 1024));
    for _ in 0..count.value() {
        inputs.push(read_input(&mut reader)?);
    }
    Ok(inputs)
}

fn read_outputs<R: io::Read>(count: CompactSize, mut reader: R) -> Result<Vec<Output>> {
    let mut outputs = Vec::with_capacity(std::cmp::min(count.value() as usize, 1024));
    for _ in 0..count.value() {
        outputs.push(Output::bitcoin_deserialize(&mut reader)?);
    }
    Ok(outputs)
}
