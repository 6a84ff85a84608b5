//! Run header encoding
//!
//! Every run queued in the write buffer starts with a 4-byte header,
//! packed explicitly as a little-endian `u32`:
//!
//! ```text
//! bits  0-9   target address   (10 bits)
//! bits 10-20  length           (11 bits)
//! bit  21     repeat flag
//! bits 22-29  repeat value     (8 bits)
//! bits 30-31  zero
//! ```

use super::StorageError;
use crate::config::MEMORY_SIZE;

/// Encoded header size in bytes
pub const HEADER_SIZE: usize = 4;

/// Highest encodable target address
pub const MAX_ADDRESS: u16 = 0x3FF;

/// Longest encodable run
pub const MAX_RUN_LENGTH: u16 = 0x7FF;

const ADDRESS_MASK: u32 = 0x3FF;
const LENGTH_SHIFT: u32 = 10;
const LENGTH_MASK: u32 = 0x7FF;
const REPEAT_FLAG: u32 = 1 << 21;
const VALUE_SHIFT: u32 = 22;

/// What a run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunKind {
    /// `length` payload bytes follow the header
    Literal,
    /// `length` copies of the value, no payload
    Repeat(u8),
}

/// Parameters of one queued run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunHeader {
    /// First address written
    pub address: u16,
    /// Number of bytes written
    pub length: u16,
    /// Literal or repeated byte
    pub kind: RunKind,
}

impl RunHeader {
    /// Create a validated header
    ///
    /// The run must fit the header's bit fields and stay inside the
    /// memory's address space.
    pub fn new(address: u16, length: usize, kind: RunKind) -> Result<Self, StorageError> {
        if length > MAX_RUN_LENGTH as usize {
            return Err(StorageError::RunTooLarge);
        }
        if address > MAX_ADDRESS || address as usize + length > MEMORY_SIZE {
            return Err(StorageError::InvalidAddress);
        }
        Ok(Self {
            address,
            length: length as u16,
            kind,
        })
    }

    /// Payload bytes that follow this header in the buffer
    pub fn payload_len(&self) -> usize {
        match self.kind {
            RunKind::Literal => self.length as usize,
            RunKind::Repeat(_) => 0,
        }
    }

    /// Pack into the on-buffer representation
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut word = (self.address as u32 & ADDRESS_MASK)
            | ((self.length as u32 & LENGTH_MASK) << LENGTH_SHIFT);
        if let RunKind::Repeat(value) = self.kind {
            word |= REPEAT_FLAG | ((value as u32) << VALUE_SHIFT);
        }
        word.to_le_bytes()
    }

    /// Unpack from the on-buffer representation
    pub fn decode(bytes: [u8; HEADER_SIZE]) -> Self {
        let word = u32::from_le_bytes(bytes);
        let kind = if word & REPEAT_FLAG != 0 {
            RunKind::Repeat((word >> VALUE_SHIFT) as u8)
        } else {
            RunKind::Literal
        };
        Self {
            address: (word & ADDRESS_MASK) as u16,
            length: ((word >> LENGTH_SHIFT) & LENGTH_MASK) as u16,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout() {
        let header = RunHeader::new(0x155, 3, RunKind::Repeat(0xA5)).unwrap();
        let word = u32::from_le_bytes(header.encode());
        assert_eq!(word & 0x3FF, 0x155);
        assert_eq!((word >> 10) & 0x7FF, 3);
        assert_ne!(word & (1 << 21), 0);
        assert_eq!((word >> 22) & 0xFF, 0xA5);
        assert_eq!(word >> 30, 0);
    }

    #[test]
    fn test_literal_has_clear_flag_and_value() {
        let header = RunHeader::new(10, 3, RunKind::Literal).unwrap();
        assert_eq!(header.encode(), [0x0A, 0x0C, 0x00, 0x00]);
        assert_eq!(header.payload_len(), 3);
    }

    #[test]
    fn test_decode_restores_fields() {
        let header = RunHeader::new(1000, 24, RunKind::Repeat(0xFF)).unwrap();
        assert_eq!(RunHeader::decode(header.encode()), header);
        assert_eq!(header.payload_len(), 0);
    }

    #[test]
    fn test_rejects_oversized_run() {
        assert_eq!(
            RunHeader::new(0, 0x800, RunKind::Literal),
            Err(StorageError::RunTooLarge)
        );
    }

    #[test]
    fn test_rejects_out_of_range_address() {
        assert_eq!(
            RunHeader::new(0x400, 1, RunKind::Literal),
            Err(StorageError::InvalidAddress)
        );
        assert!(RunHeader::new(1023, 1, RunKind::Literal).is_ok());
    }
}
