//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in carphone-hal:
//!
//! - Serial EEPROMs (25xx family over SPI)

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
