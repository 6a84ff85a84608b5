//! Blocking memory access
//!
//! These helpers spin until the memory is idle and, for writes, until each
//! byte has been programmed. They stall the caller for the full duration of
//! the operation, so they are reserved for boot-time loading and
//! formatting. The steady-state loop goes through the
//! [`WriteEngine`](super::WriteEngine) instead.

use carphone_hal::{Address, RawMemory};

/// Spin until no write is in flight
pub fn wait_until_idle<M: RawMemory>(memory: &mut M) {
    while memory.is_write_in_progress() {
        core::hint::spin_loop();
    }
}

/// Read one byte once the memory is idle
pub fn read_byte<M: RawMemory>(memory: &mut M, address: Address) -> u8 {
    wait_until_idle(memory);
    memory.read_byte(address)
}

/// Read `buffer.len()` bytes once the memory is idle
pub fn read_bytes<M: RawMemory>(memory: &mut M, address: Address, buffer: &mut [u8]) {
    wait_until_idle(memory);
    memory.read_bytes(address, buffer);
}

/// Write one byte and wait for it to be programmed
///
/// Returns `true` if the byte had to be programmed, `false` if it already
/// held `value`.
pub fn write_byte<M: RawMemory>(memory: &mut M, address: Address, value: u8) -> bool {
    wait_until_idle(memory);
    let started = memory.try_start_write(address, value);
    wait_until_idle(memory);
    started
}

/// Write `data` starting at `address`, one byte at a time
///
/// Returns the number of bytes that actually had to be programmed.
pub fn write_bytes<M: RawMemory>(memory: &mut M, address: Address, data: &[u8]) -> usize {
    let mut current = address;
    let mut programmed = 0;
    for &value in data {
        if write_byte(memory, current, value) {
            programmed += 1;
        }
        current = current.wrapping_add(1);
    }
    programmed
}

/// Write `count` copies of `value` starting at `address`
///
/// Returns the number of bytes that actually had to be programmed.
pub fn fill<M: RawMemory>(memory: &mut M, address: Address, value: u8, count: usize) -> usize {
    let mut current = address;
    let mut programmed = 0;
    for _ in 0..count {
        if write_byte(memory, current, value) {
            programmed += 1;
        }
        current = current.wrapping_add(1);
    }
    programmed
}
