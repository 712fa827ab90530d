// Length-prefixed block padding.
//
// Layout of a padded message (block size `b`):
//
// ```text
// +-----------------------+------------------+---------------+
// | header block (b)      | data             | pad (padLen)  |
// | padLen u16 LE | zeros |                  | zeros         |
// +-----------------------+------------------+---------------+
// ```
//
// Data that already fills whole blocks gets an all-zero header (padLen 0).

use crate::error::{PeekTrustError, Result};

/// Size of the little-endian pad length field at the start of the header block.
const PAD_LEN_FIELD: usize = 2;

/// Pad `data` to a multiple of `block_size`, prefixed by a header block that
/// records how many trailing zero bytes were added.
///
/// Fails on empty `data`, on `block_size < 2`, and on block sizes whose pad
/// length cannot be expressed in the 16-bit header field.
pub fn pad(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    check_block_size(block_size)?;
    if data.is_empty() {
        return Err(PeekTrustError::EmptyInput);
    }

    let rem = data.len() % block_size;
    let pad_len = if rem == 0 { 0 } else { block_size - rem };

    // The buffer starts zeroed, so the reserved header bytes and the trailing
    // padding need no explicit writes.
    let mut padded = vec![0u8; block_size + data.len() + pad_len];
    padded[..PAD_LEN_FIELD].copy_from_slice(&(pad_len as u16).to_le_bytes());
    padded[block_size..block_size + data.len()].copy_from_slice(data);
    Ok(padded)
}

/// Reverse [`pad`], returning the original data as a sub-slice of `data`.
///
/// Returns [`PeekTrustError::InvalidPadding`] when the input is shorter than
/// two blocks, the recorded pad length is not below `block_size`, or any byte
/// that `pad` leaves zeroed (reserved header bytes, trailing padding) is set.
pub fn unpad(data: &[u8], block_size: usize) -> Result<&[u8]> {
    check_block_size(block_size)?;
    if data.len() < 2 * block_size {
        return Err(PeekTrustError::InvalidPadding);
    }

    let pad_len = u16::from_le_bytes([data[0], data[1]]) as usize;
    if pad_len >= block_size {
        return Err(PeekTrustError::InvalidPadding);
    }

    let reserved = &data[PAD_LEN_FIELD..block_size];
    let trailing = &data[data.len() - pad_len..];
    if reserved.iter().chain(trailing).any(|&b| b != 0) {
        return Err(PeekTrustError::InvalidPadding);
    }

    Ok(&data[block_size..data.len() - pad_len])
}

fn check_block_size(block_size: usize) -> Result<()> {
    if block_size < PAD_LEN_FIELD || block_size > u16::MAX as usize {
        return Err(PeekTrustError::InvalidBlockSize(block_size));
    }
    Ok(())
}
