//! Carphone Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that the storage core
//! is written against. Chip- or part-specific drivers implement them (see
//! `carphone-drivers`), and the `mock` feature provides an in-memory fake so
//! the core can be exercised deterministically on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  carphone-core (storage engine, API)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  carphone-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ carphone-     │       │ MockMemory    │
//! │ drivers (SPI) │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`memory::RawMemory`] - Byte-addressable non-volatile memory

#![no_std]
#![deny(unsafe_code)]

pub mod memory;
#[cfg(feature = "mock")]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use memory::{Address, RawMemory};
#[cfg(feature = "mock")]
pub use mock::MockMemory;
