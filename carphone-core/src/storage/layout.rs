//! Persisted layout
//!
//! The whole configuration is one contiguous blob starting at address 0.
//! Offsets are computed at compile time from the field widths in
//! [`config`](crate::config), so changing a width moves every later field;
//! bump [`STORAGE_VERSION`](crate::config::STORAGE_VERSION) when doing so.
//!
//! ```text
//!   0 marker            1 version           2 lcd view angle
//!   3 volume[4]         7 directory cursor  8 ringtone
//!   9 last call        12 cumulative call  15 total call
//!  18 toggles          19 active own no.   20 programming count
//!  21 tetris score     25 tetris initials  28 paired name[32]
//!  60 own numbers[2]   70 last dialed      86 speed dial[3]
//! 134 security code   137 caller id mode  138 directory[29]
//! 776 credit cards[6] 872 end
//! ```

use core::ops::Range;

use crate::codec::packed_len;
use crate::config::{
    CREDIT_CARD_COUNT, CREDIT_CARD_SYMBOLS, DIRECTORY_NAME_LEN, DIRECTORY_NUMBER_SYMBOLS,
    DIRECTORY_SIZE, LAST_DIALED_SYMBOLS, MEMORY_SIZE, OWN_NUMBER_COUNT, OWN_NUMBER_SYMBOLS,
    PAIRED_DEVICE_NAME_LEN, SECURITY_CODE_LEN, SPEED_DIAL_COUNT, SPEED_DIAL_SYMBOLS,
    TETRIS_INITIALS_LEN, VOLUME_MODE_COUNT, WRITE_BUFFER_CAPACITY,
};

use super::header::HEADER_SIZE;

/// A contiguous byte range of the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Address of the first byte
    pub offset: u16,
    /// Width in bytes
    pub len: u16,
}

impl Field {
    /// Field at a fixed offset
    pub const fn at(offset: u16, len: u16) -> Self {
        Self { offset, len }
    }

    /// Field directly after `previous`
    pub const fn after(previous: Field, len: usize) -> Self {
        Self {
            offset: previous.end(),
            len: len as u16,
        }
    }

    /// Address one past the last byte
    pub const fn end(self) -> u16 {
        self.offset + self.len
    }

    /// Byte range inside the blob
    pub const fn range(self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }

    /// Sub-field at `offset` bytes into this one
    pub const fn slice(self, offset: u16, len: usize) -> Self {
        Self {
            offset: self.offset + offset,
            len: len as u16,
        }
    }
}

/// `count` equally sized fields laid out back to back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldArray {
    /// Address of the first element
    pub offset: u16,
    /// Width of one element
    pub stride: u16,
    /// Number of elements
    pub count: u16,
}

impl FieldArray {
    /// Array directly after `previous`
    pub const fn after(previous: Field, stride: usize, count: usize) -> Self {
        Self {
            offset: previous.end(),
            stride: stride as u16,
            count: count as u16,
        }
    }

    /// The whole array as one field
    pub const fn span(self) -> Field {
        Field::at(self.offset, self.stride * self.count)
    }

    /// Element `index`, if in range
    pub const fn get(self, index: usize) -> Option<Field> {
        if index >= self.count as usize {
            return None;
        }
        Some(Field::at(self.offset + index as u16 * self.stride, self.stride))
    }
}

const CALL_TIMER_LEN: usize = 3;

/// Compatibility marker
pub const MARKER: Field = Field::at(0, 1);
/// Layout version
pub const VERSION: Field = Field::after(MARKER, 1);
/// LCD view angle
pub const LCD_VIEW_ANGLE: Field = Field::after(VERSION, 1);
/// Volume level per mode
pub const VOLUME_LEVELS: FieldArray = FieldArray::after(LCD_VIEW_ANGLE, 1, VOLUME_MODE_COUNT);
/// Last selected directory entry
pub const DIRECTORY_CURSOR: Field = Field::after(VOLUME_LEVELS.span(), 1);
/// Ringtone index
pub const RINGTONE: Field = Field::after(DIRECTORY_CURSOR, 1);
/// Duration of the last call
pub const LAST_CALL_TIME: Field = Field::after(RINGTONE, CALL_TIMER_LEN);
/// Resettable cumulative call time
pub const CUMULATIVE_CALL_TIME: Field = Field::after(LAST_CALL_TIME, CALL_TIMER_LEN);
/// Lifetime call time
pub const TOTAL_CALL_TIME: Field = Field::after(CUMULATIVE_CALL_TIME, CALL_TIMER_LEN);
/// Toggle bits
pub const TOGGLES: Field = Field::after(TOTAL_CALL_TIME, 1);
/// Which own number is active
pub const ACTIVE_OWN_NUMBER: Field = Field::after(TOGGLES, 1);
/// Times programming mode was entered
pub const PROGRAMMING_COUNT: Field = Field::after(ACTIVE_OWN_NUMBER, 1);
/// Tetris high score (little-endian u32)
pub const TETRIS_HIGH_SCORE: Field = Field::after(PROGRAMMING_COUNT, 4);
/// Tetris high score initials
pub const TETRIS_INITIALS: Field = Field::after(TETRIS_HIGH_SCORE, TETRIS_INITIALS_LEN);
/// Bluetooth paired device name
pub const PAIRED_DEVICE_NAME: Field = Field::after(TETRIS_INITIALS, PAIRED_DEVICE_NAME_LEN);
/// Own numbers
pub const OWN_NUMBERS: FieldArray = FieldArray::after(
    PAIRED_DEVICE_NAME,
    packed_len(OWN_NUMBER_SYMBOLS),
    OWN_NUMBER_COUNT,
);
/// Last dialed number
pub const LAST_DIALED: Field = Field::after(OWN_NUMBERS.span(), packed_len(LAST_DIALED_SYMBOLS));
/// Speed dial numbers
pub const SPEED_DIAL: FieldArray = FieldArray::after(
    LAST_DIALED,
    packed_len(SPEED_DIAL_SYMBOLS),
    SPEED_DIAL_COUNT,
);
/// Security code
pub const SECURITY_CODE: Field = Field::after(SPEED_DIAL.span(), packed_len(SECURITY_CODE_LEN));
/// Caller ID mode
pub const CALLER_ID_MODE: Field = Field::after(SECURITY_CODE, 1);

/// Packed number width inside a directory entry
pub const DIRECTORY_NUMBER_LEN: usize = packed_len(DIRECTORY_NUMBER_SYMBOLS);
/// Directory entries (number, then name)
pub const DIRECTORY: FieldArray = FieldArray::after(
    CALLER_ID_MODE,
    DIRECTORY_NUMBER_LEN + DIRECTORY_NAME_LEN,
    DIRECTORY_SIZE,
);
/// Credit card numbers
pub const CREDIT_CARDS: FieldArray = FieldArray::after(
    DIRECTORY.span(),
    packed_len(CREDIT_CARD_SYMBOLS),
    CREDIT_CARD_COUNT,
);

/// Size of the whole blob
pub const RECORD_SIZE: usize = CREDIT_CARDS.span().end() as usize;

const _: () = assert!(RECORD_SIZE <= MEMORY_SIZE);
// The widest single update (the paired device name) must fit the buffer
const _: () = assert!(HEADER_SIZE + PAIRED_DEVICE_NAME_LEN <= WRITE_BUFFER_CAPACITY);
const _: () = assert!(HEADER_SIZE + DIRECTORY.stride as usize <= WRITE_BUFFER_CAPACITY);

/// Number part of directory entry `index`
pub const fn directory_number(index: usize) -> Option<Field> {
    match DIRECTORY.get(index) {
        Some(entry) => Some(entry.slice(0, DIRECTORY_NUMBER_LEN)),
        None => None,
    }
}

/// Name part of directory entry `index`
pub const fn directory_name(index: usize) -> Option<Field> {
    match DIRECTORY.get(index) {
        Some(entry) => Some(entry.slice(DIRECTORY_NUMBER_LEN as u16, DIRECTORY_NAME_LEN)),
        None => None,
    }
}
