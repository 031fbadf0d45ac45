//! The Bitcoin-inherited transaction Merkle tree, and the SegWit witness
//! commitment built on top of it.

use crate::h256::{sha256d, H256};

/// Computes a Merkle root over an ordered sequence of 32-byte leaves.
///
/// An odd-length level is extended by duplicating its last element before
/// pairing (the CVE-2012-2459 duplication rule). An empty input yields the
/// zero hash.
pub fn root<I: IntoIterator<Item = H256>>(leaves: I) -> H256 {
    let mut level: Vec<H256> = leaves.into_iter().collect();
    if level.is_empty() {
        return H256::ZERO;
    }
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().expect("level is nonempty");
            level.push(last);
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut bytes = Vec::with_capacity(64);
                bytes.extend_from_slice(pair[0].as_bytes());
                bytes.extend_from_slice(pair[1].as_bytes());
                sha256d(&bytes)
            })
            .collect();
    }
    level[0]
}

/// The fixed tag bitcoin-core prefixes a witness commitment output's
/// scriptPubKey with: `OP_RETURN OP_PUSH36 0xaa21a9ed`.
pub const WITNESS_COMMITMENT_HEADER: [u8; 6] = [0x6a, 0x24, 0xaa, 0x21, 0xa9, 0xed];

/// Builds the scriptPubKey for a witness commitment output, given the
/// witness Merkle root and the coinbase input's witness reserved value.
pub fn witness_commitment_script(witness_merkle_root: H256, witness_reserved_value: &[u8; 32]) -> Vec<u8> {
    let mut preimage = Vec::with_capacity(64);
    preimage.extend_from_slice(witness_merkle_root.as_bytes());
    preimage.extend_from_slice(witness_reserved_value);
    let commitment = sha256d(&preimage);

    let mut script = Vec::with_capacity(WITNESS_COMMITMENT_HEADER.len() + 32);
    script.extend_from_slice(&WITNESS_COMMITMENT_HEADER);
    script.extend_from_slice(commitment.as_bytes());
    script
}

/// Parses a candidate witness commitment out of a coinbase output script.
///
/// Returns `None` if `script` doesn't carry the `OP_RETURN 0x24 0xaa21a9ed`
/// tag at all, regardless of length; a script too short to hold the tag and
/// the 32-byte commitment is also not a match.
pub fn parse_witness_commitment(script: &[u8]) -> Option<H256> {
    if script.len() < WITNESS_COMMITMENT_HEADER.len() + 32 {
        return None;
    }
    if &script[..WITNESS_COMMITMENT_HEADER.len()] != &WITNESS_COMMITMENT_HEADER[..] {
        return None;
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&script[WITNESS_COMMITMENT_HEADER.len()..WITNESS_COMMITMENT_HEADER.len() + 32]);
    Some(H256::from_bytes(bytes))
}

/// Verifies that `commitment` matches the expected value for
/// `witness_merkle_root` and `witness_reserved_value`.
pub fn verify_witness_commitment(
    commitment: H256,
    witness_merkle_root: H256,
    witness_reserved_value: &[u8; 32],
) -> bool {
    let mut preimage = Vec::with_capacity(64);
    preimage.extend_from_slice(witness_merkle_root.as_bytes());
    preimage.extend_from_slice(witness_reserved_value);
    sha256d(&preimage) == commitment
}
