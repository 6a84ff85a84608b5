//! Board wiring
//!
//! Raspberry Pi Pico with a 25LC080 EEPROM on SPI0:
//!
//! | Signal | GPIO |
//! |--------|------|
//! | MISO   | 16   |
//! | CS     | 17   |
//! | SCK    | 18   |
//! | MOSI   | 19   |
//!
//! The pins themselves are taken from the peripheral set in `main`.

/// SPI clock for the EEPROM (25LC080 is rated to 10 MHz at 4.5 V,
/// 5 MHz at 2.5 V)
pub const EEPROM_SPI_FREQUENCY_HZ: u32 = 2_000_000;

/// EEPROM array size in bytes
pub const EEPROM_SIZE: usize = 1024;
