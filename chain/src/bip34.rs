//! BIP 34 height encoding: the block height a coinbase script pushes as its
//! first push-only element, once BIP 34 is active.

/// Minimally encodes `height` as a bitcoin-core `CScriptNum` push: a
/// length-prefixed little-endian integer, with an extra zero byte appended
/// when the high bit of the last byte would otherwise look like a sign bit.
pub fn encode_height(height: u32) -> Vec<u8> {
    if height == 0 {
        return vec![0x00];
    }
    let mut bytes = Vec::new();
    let mut value = height;
    while value > 0 {
        bytes.push((value & 0xff) as u8);
        value >>= 8;
    }
    if bytes.last().copied().unwrap_or(0) & 0x80 != 0 {
        bytes.push(0x00);
    }
    let mut script = Vec::with_capacity(bytes.len() + 1);
    script.push(bytes.len() as u8);
    script.extend_from_slice(&bytes);
    script
}

/// Reads a BIP 34 height out of the start of a coinbase script, if the first
/// byte is a plausible minimal push (1..=4 bytes, enough for any realistic
/// height, consistent with bitcoin-core's own bound).
pub fn decode_height(script: &[u8]) -> Option<u32> {
    let push_len = *script.first()? as usize;
    if push_len == 0 || push_len > 4 {
        return None;
    }
    let bytes = script.get(1..1 + push_len)?;
    let mut value: u32 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        value |= (*byte as u32) << (8 * i);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_round_trips_through_encode_and_decode() {
        for height in [0u32, 1, 255, 256, 227_931, 700_000, 16_777_215] {
            let script = encode_height(height);
            assert_eq!(decode_height(&script), Some(height));
        }
    }

    #[test]
    fn high_bit_set_gets_a_padding_byte() {
        let script = encode_height(0x80);
        assert_eq!(script, vec![2, 0x80, 0x00]);
        assert_eq!(decode_height(&script), Some(0x80));
    }

    #[test]
    fn empty_script_has_no_height() {
        assert_eq!(decode_height(&[]), None);
    }
}
