//! In-memory fake of the non-volatile memory
//!
//! Behaves like an erased EEPROM (all cells `0xFF`) with a configurable
//! write latency, measured in busy-flag polls rather than wall-clock time
//! so tests stay deterministic. Every started write is recorded so tests
//! can check ordering and skip behaviour.

use heapless::Vec;

use crate::memory::{Address, RawMemory};

/// Maximum number of started writes remembered by the fake
pub const WRITE_LOG_CAPACITY: usize = 2048;

/// Value of an erased cell
pub const ERASED: u8 = 0xFF;

/// In-memory non-volatile memory of `N` bytes
#[derive(Debug, Clone)]
pub struct MockMemory<const N: usize> {
    cells: [u8; N],
    /// Number of busy polls a started write lasts
    write_latency: u8,
    /// Busy polls left for the write in flight
    busy_polls: u8,
    /// Addresses of started writes, in order
    write_log: Vec<Address, WRITE_LOG_CAPACITY>,
    /// Writes started while another one was still in flight
    overlapped_writes: u32,
    protect_calls: u32,
    protected: bool,
}

impl<const N: usize> Default for MockMemory<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MockMemory<N> {
    /// Create an erased memory whose writes complete immediately
    pub fn new() -> Self {
        Self::with_write_latency(0)
    }

    /// Create an erased memory whose writes stay busy for `polls` polls
    pub fn with_write_latency(polls: u8) -> Self {
        Self {
            cells: [ERASED; N],
            write_latency: polls,
            busy_polls: 0,
            write_log: Vec::new(),
            overlapped_writes: 0,
            protect_calls: 0,
            protected: false,
        }
    }

    /// Create a memory preloaded with `image` (remaining cells erased)
    pub fn from_image(image: &[u8]) -> Self {
        let mut memory = Self::new();
        let len = image.len().min(N);
        memory.cells[..len].copy_from_slice(&image[..len]);
        memory
    }

    /// Raw cell contents
    pub fn cells(&self) -> &[u8; N] {
        &self.cells
    }

    /// Mutable raw cell contents, bypassing write bookkeeping
    ///
    /// Used by tests to simulate corruption.
    pub fn cells_mut(&mut self) -> &mut [u8; N] {
        &mut self.cells
    }

    /// Addresses of all started writes, oldest first
    pub fn write_log(&self) -> &[Address] {
        &self.write_log
    }

    /// Forget the recorded writes
    pub fn clear_write_log(&mut self) {
        self.write_log.clear();
    }

    /// Number of writes started while the previous one was still busy
    pub fn overlapped_writes(&self) -> u32 {
        self.overlapped_writes
    }

    /// Number of times [`RawMemory::protect`] was called
    pub fn protect_calls(&self) -> u32 {
        self.protect_calls
    }

    /// Whether the memory is currently write-protected
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Change the write latency for subsequent writes
    pub fn set_write_latency(&mut self, polls: u8) {
        self.write_latency = polls;
    }
}

impl<const N: usize> RawMemory for MockMemory<N> {
    fn size(&self) -> usize {
        N
    }

    fn read_byte(&mut self, address: Address) -> u8 {
        self.cells.get(address as usize).copied().unwrap_or(ERASED)
    }

    fn try_start_write(&mut self, address: Address, value: u8) -> bool {
        let Some(cell) = self.cells.get_mut(address as usize) else {
            return false;
        };
        if *cell == value {
            return false;
        }
        if self.busy_polls > 0 {
            self.overlapped_writes = self.overlapped_writes.saturating_add(1);
        }

        *cell = value;
        self.protected = false;
        self.busy_polls = self.write_latency;
        // The log is a test aid; once full, later writes are not recorded
        let _ = self.write_log.push(address);
        true
    }

    fn is_write_in_progress(&mut self) -> bool {
        if self.busy_polls == 0 {
            return false;
        }
        self.busy_polls -= 1;
        true
    }

    fn protect(&mut self) {
        self.protect_calls = self.protect_calls.saturating_add(1);
        self.protected = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_erased() {
        let mut memory = MockMemory::<16>::new();
        assert!(memory.cells().iter().all(|&b| b == ERASED));
        assert_eq!(memory.read_byte(3), ERASED);
        assert_eq!(memory.size(), 16);
    }

    #[test]
    fn test_write_skip_when_equal() {
        let mut memory = MockMemory::<16>::with_write_latency(3);
        assert!(!memory.try_start_write(4, ERASED));
        assert!(!memory.is_write_in_progress());
        assert!(memory.write_log().is_empty());
    }

    #[test]
    fn test_write_latency_counts_polls() {
        let mut memory = MockMemory::<16>::with_write_latency(2);
        assert!(memory.try_start_write(1, 0x42));
        assert!(memory.is_write_in_progress());
        assert!(memory.is_write_in_progress());
        assert!(!memory.is_write_in_progress());
        assert_eq!(memory.read_byte(1), 0x42);
        assert_eq!(memory.write_log(), &[1]);
    }

    #[test]
    fn test_out_of_range() {
        let mut memory = MockMemory::<4>::new();
        assert!(!memory.try_start_write(4, 0x00));
        assert_eq!(memory.read_byte(100), ERASED);
    }

    #[test]
    fn test_overlapped_write_is_counted() {
        let mut memory = MockMemory::<8>::with_write_latency(5);
        assert!(memory.try_start_write(0, 1));
        assert!(memory.try_start_write(1, 1));
        assert_eq!(memory.overlapped_writes(), 1);
    }

    #[test]
    fn test_read_bytes_default_impl() {
        let mut memory = MockMemory::<8>::from_image(&[1, 2, 3, 4]);
        let mut buffer = [0u8; 6];
        memory.read_bytes(2, &mut buffer);
        assert_eq!(buffer, [3, 4, ERASED, ERASED, ERASED, ERASED]);
    }

    #[test]
    fn test_protect() {
        let mut memory = MockMemory::<8>::new();
        memory.protect();
        assert!(memory.is_protected());
        assert_eq!(memory.protect_calls(), 1);
        memory.try_start_write(0, 0);
        assert!(!memory.is_protected());
    }
}
