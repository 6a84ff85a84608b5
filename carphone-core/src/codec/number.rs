//! Phone number packing
//!
//! Dialable numbers are stored two symbols per byte, high nibble first:
//!
//! ```text
//! symbol:  0-9   *    #    P    M    (invalid)  (end)
//! nibble:  0-9   0xA  0xB  0xC  0xD  0xE        0xF
//! ```
//!
//! `P` is a dialing pause and `M` recalls a credit card memory. A field is
//! padded with `0xF` after the last symbol, so a field whose first byte is
//! `0xFF` holds no number at all.

use heapless::String;

use super::CodecError;
use crate::config::MAX_NUMBER_SYMBOLS;

/// Nibble that ends a number
pub const TERMINATOR: u8 = 0x0F;

/// Nibble that never encodes a symbol
pub const INVALID_NIBBLE: u8 = 0x0E;

/// Byte value of an empty (erased) number field
pub const EMPTY: u8 = 0xFF;

/// Decoded number of any stored width
pub type NumberString = String<MAX_NUMBER_SYMBOLS>;

/// Bytes needed to pack `max_symbols` symbols
pub const fn packed_len(max_symbols: usize) -> usize {
    (max_symbols + 1) / 2
}

/// Nibble value of a dialable symbol
pub fn symbol_to_nibble(symbol: u8) -> Option<u8> {
    match symbol {
        b'0'..=b'9' => Some(symbol - b'0'),
        b'*' => Some(0x0A),
        b'#' => Some(0x0B),
        b'P' => Some(0x0C),
        b'M' => Some(0x0D),
        _ => None,
    }
}

/// Symbol encoded by a nibble
///
/// Returns `None` for [`INVALID_NIBBLE`] and [`TERMINATOR`].
pub fn nibble_to_symbol(nibble: u8) -> Option<u8> {
    match nibble {
        0x00..=0x09 => Some(b'0' + nibble),
        0x0A => Some(b'*'),
        0x0B => Some(b'#'),
        0x0C => Some(b'P'),
        0x0D => Some(b'M'),
        _ => None,
    }
}

/// Check whether a packed field holds no number
pub fn is_empty(packed: &[u8]) -> bool {
    packed.first().map_or(true, |&b| b == EMPTY)
}

/// Pack `text` into `out`, keeping at most `max_symbols` symbols
///
/// When `text` is longer than `max_symbols` the excess is dropped from the
/// front, so the most recently entered digits survive. `None` erases the
/// field. The whole input is validated before `out` is touched.
///
/// Returns the number of bytes written (`packed_len(max_symbols)`).
pub fn compress(text: Option<&str>, max_symbols: usize, out: &mut [u8]) -> Result<usize, CodecError> {
    let len = packed_len(max_symbols);
    let out = out.get_mut(..len).ok_or(CodecError::BufferTooSmall)?;

    let Some(text) = text else {
        out.fill(EMPTY);
        return Ok(len);
    };

    let bytes = text.as_bytes();
    if let Some(&bad) = bytes.iter().find(|&&b| symbol_to_nibble(b).is_none()) {
        return Err(CodecError::InvalidSymbol(bad));
    }

    let kept = &bytes[bytes.len().saturating_sub(max_symbols)..];
    out.fill(EMPTY);
    for (i, nibble) in kept.iter().filter_map(|&b| symbol_to_nibble(b)).enumerate() {
        let byte = &mut out[i / 2];
        if i % 2 == 0 {
            *byte = (nibble << 4) | (*byte & 0x0F);
        } else {
            *byte = (*byte & 0xF0) | nibble;
        }
    }

    Ok(len)
}

/// Unpack at most `symbol_count` symbols from `packed`
///
/// Stops at the first [`TERMINATOR`]. An [`INVALID_NIBBLE`] is skipped but
/// still counts toward `symbol_count`. Symbols beyond the capacity of the
/// returned string are dropped.
pub fn uncompress<const N: usize>(packed: &[u8], symbol_count: usize) -> String<N> {
    let mut text = String::new();
    let nibbles = packed
        .iter()
        .flat_map(|&b| [b >> 4, b & 0x0F])
        .take(symbol_count);

    for nibble in nibbles {
        if nibble == TERMINATOR {
            break;
        }
        if let Some(symbol) = nibble_to_symbol(nibble) {
            if text.push(symbol as char).is_err() {
                break;
            }
        }
    }

    text
}
