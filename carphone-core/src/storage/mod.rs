//! Persistent storage engine
//!
//! Keeps an in-memory mirror of every persisted setting and writes changes
//! back to non-volatile memory without ever blocking the control loop:
//!
//! ```text
//!  setter ──► StorageRecord (mirror) ──► WriteBuffer (runs) ──► WriteEngine ──► RawMemory
//!                    │                                         one byte per tick
//!                    └──► SortedNameIndex (rebuilt on directory change)
//! ```
//!
//! [`Storage`] bundles all of it into one context value owned by the
//! application. Blocking memory access ([`blocking`]) is only used while
//! loading or formatting at boot.

pub mod blocking;
pub mod buffer;
pub mod context;
pub mod directory;
pub mod engine;
pub mod header;
pub mod layout;
pub mod phonebook;
pub mod record;
pub mod settings;

pub use buffer::WriteBuffer;
pub use context::{BootOutcome, Storage};
pub use directory::SortedNameIndex;
pub use engine::{EngineStats, TickOutcome, WriteEngine};
pub use header::{RunHeader, RunKind, HEADER_SIZE};
pub use layout::{Field, FieldArray, RECORD_SIZE};
pub use record::StorageRecord;

/// Errors from storage operations
///
/// None of these are fatal. A setter that reports [`BufferOverflow`] or
/// [`RunTooLarge`] has still updated the in-memory mirror; only the
/// persistence of that update was dropped.
///
/// [`BufferOverflow`]: StorageError::BufferOverflow
/// [`RunTooLarge`]: StorageError::RunTooLarge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Not enough free space in the write buffer right now
    BufferOverflow,
    /// Run can never fit in the write buffer, or exceeds the header's length field
    RunTooLarge,
    /// Run starts or ends outside the memory's address space
    InvalidAddress,
    /// Setter argument out of range; nothing was changed
    InvalidArgument,
}
