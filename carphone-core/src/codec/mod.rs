//! Compact encodings for persisted fields
//!
//! - [`number`] packs dialable numbers into 4-bit symbols
//! - [`text`] stores short ASCII strings in fixed-width, NUL-padded fields

pub mod number;
pub mod text;

pub use number::{compress, packed_len, uncompress, NumberString};
pub use text::{decode_text, encode_text};

/// Errors from encoding a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Input contains a byte outside the field's alphabet
    InvalidSymbol(u8),
    /// Destination cannot hold the encoded field
    BufferTooSmall,
}
