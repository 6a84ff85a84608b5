//! Board-agnostic storage core for the car phone handset firmware
//!
//! This crate contains everything about persisted configuration that does
//! not depend on a specific memory chip:
//!
//! - Phone number and name codecs
//! - Write buffer and the non-blocking write engine
//! - Persisted layout and the in-memory record
//! - Alphabetic directory index
//! - Configuration constants and factory defaults

#![no_std]
#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod storage;
