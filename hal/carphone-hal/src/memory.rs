//! Non-volatile memory abstractions
//!
//! Byte-level interface to the memory that backs the persisted
//! configuration. Buffering and pacing happen in the storage core; a
//! driver only reads bytes, starts single-byte writes and reports whether
//! one is still in flight.

/// Byte address inside the non-volatile memory
pub type Address = u16;

/// Byte-addressable non-volatile memory
///
/// Reads are blocking. Writes are split into a non-blocking start and a
/// busy flag, so a cooperative scheduler can interleave other work while
/// the memory cell is being programmed.
///
/// Implementations must compare before writing: [`try_start_write`]
/// returns `false` without touching the hardware when the stored byte
/// already holds `value`. Callers therefore cannot assume a fixed
/// completion time for any write.
///
/// [`try_start_write`]: RawMemory::try_start_write
pub trait RawMemory {
    /// Total number of addressable bytes
    fn size(&self) -> usize;

    /// Read a single byte
    ///
    /// Must not be called while a write is in progress; the result of such
    /// a read is undefined on most parts.
    fn read_byte(&mut self, address: Address) -> u8;

    /// Read consecutive bytes starting at `address`
    ///
    /// The default implementation issues one [`read_byte`] per byte.
    /// Drivers whose parts auto-increment the address should override it.
    ///
    /// [`read_byte`]: RawMemory::read_byte
    fn read_bytes(&mut self, address: Address, buffer: &mut [u8]) {
        let mut current = address;
        for slot in buffer.iter_mut() {
            *slot = self.read_byte(current);
            current = current.wrapping_add(1);
        }
    }

    /// Start programming `value` into `address` without waiting
    ///
    /// Returns `true` if a write was started, `false` if it was skipped
    /// because the cell already holds `value` (or the address is out of
    /// range).
    fn try_start_write(&mut self, address: Address, value: u8) -> bool;

    /// Check whether a previously started write is still in flight
    fn is_write_in_progress(&mut self) -> bool;

    /// Put the memory into a write-protected state
    ///
    /// Called by the write engine whenever it runs out of work. Parts
    /// without a protect command keep the default no-op.
    fn protect(&mut self) {}
}
