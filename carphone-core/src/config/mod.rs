//! Configuration constants and types
//!
//! Field widths, value ranges and factory defaults for the persisted
//! handset configuration. Everything here is board-agnostic; the firmware
//! supplies its own [`FactoryDefaults`] generated from `factory.toml`.

pub mod defaults;
pub mod types;

pub use defaults::*;
pub use types::*;

/// Size of the non-volatile memory (10-bit address space)
pub const MEMORY_SIZE: usize = 1024;

/// Capacity of the deferred write buffer, headers included
pub const WRITE_BUFFER_CAPACITY: usize = 512;

/// Compatibility marker stored at address 0
pub const STORAGE_MARKER: u8 = 0xA5;

/// Layout version stored at address 1
///
/// Bump whenever the persisted layout changes; a mismatch at boot forces
/// a factory reset.
pub const STORAGE_VERSION: u8 = 1;

/// Number of volume modes
pub const VOLUME_MODE_COUNT: usize = 4;

/// Highest volume level
pub const MAX_VOLUME_LEVEL: u8 = 7;

/// Highest LCD view angle setting
pub const MAX_LCD_VIEW_ANGLE: u8 = 15;

/// Number of selectable ringtones
pub const RINGTONE_COUNT: u8 = 8;

/// Number of own (subscriber) numbers
pub const OWN_NUMBER_COUNT: usize = 2;

/// Digits in an own number
pub const OWN_NUMBER_SYMBOLS: usize = 10;

/// Symbols in the last dialed number
pub const LAST_DIALED_SYMBOLS: usize = 32;

/// Number of speed dial slots
pub const SPEED_DIAL_COUNT: usize = 3;

/// Symbols in a speed dial number
pub const SPEED_DIAL_SYMBOLS: usize = 32;

/// Number of directory entries
pub const DIRECTORY_SIZE: usize = 29;

/// Symbols in a directory number
pub const DIRECTORY_NUMBER_SYMBOLS: usize = 24;

/// Characters in a directory name
pub const DIRECTORY_NAME_LEN: usize = 10;

/// Number of credit card memories
pub const CREDIT_CARD_COUNT: usize = 6;

/// Symbols in a credit card number
pub const CREDIT_CARD_SYMBOLS: usize = 32;

/// Digits in the security code
pub const SECURITY_CODE_LEN: usize = 6;

/// Characters in the Bluetooth paired device name
pub const PAIRED_DEVICE_NAME_LEN: usize = 32;

/// Characters in the Tetris high score initials
pub const TETRIS_INITIALS_LEN: usize = 3;

/// Longest number field, in symbols
pub const MAX_NUMBER_SYMBOLS: usize = 32;

/// Number of directory entries seeded by a factory reset
pub const SEED_ENTRY_COUNT: usize = 6;

/// Sentinel for "no directory entry"
pub const NO_ENTRY: u8 = 0xFF;
