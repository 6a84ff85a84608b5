//! Non-volatile memory drivers

pub mod spi25;

pub use spi25::{Spi25Config, Spi25Eeprom};
