//! Circular write buffer
//!
//! Fixed-capacity FIFO of runs waiting to be written. Each run is a
//! [`RunHeader`] optionally followed by its literal payload, stored
//! back-to-back and wrapping at the end of the array.
//!
//! Enqueueing is all-or-nothing: a run that does not fit leaves `head`,
//! `tail` and `remaining` untouched. Runs are never merged; when two runs
//! target the same address the later one wins because it drains later.
//!
//! The buffer has a single producer (setters) and a single consumer (the
//! engine tick). Both need `&mut self`; on target the owning context lives
//! in a critical-section mutex, which is the only synchronisation these
//! counters need.

use super::header::{RunHeader, RunKind, HEADER_SIZE};
use super::StorageError;

/// Circular byte buffer holding queued runs
#[derive(Debug, Clone)]
pub struct WriteBuffer<const N: usize> {
    data: [u8; N],
    /// Next slot to write
    head: usize,
    /// Next slot to read
    tail: usize,
    /// Free bytes
    remaining: usize,
}

impl<const N: usize> Default for WriteBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> WriteBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
            remaining: N,
        }
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Free bytes
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Queued bytes (headers and payloads)
    pub fn len(&self) -> usize {
        N - self.remaining
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.remaining == N
    }

    /// Write position
    pub fn head(&self) -> usize {
        self.head
    }

    /// Read position
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Discard everything queued
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.remaining = N;
    }

    /// Queue a literal run writing `bytes` starting at `address`
    ///
    /// An empty slice queues nothing.
    pub fn enqueue_literal(&mut self, address: u16, bytes: &[u8]) -> Result<(), StorageError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let header = RunHeader::new(address, bytes.len(), RunKind::Literal)?;
        self.reserve(HEADER_SIZE + bytes.len())?;

        self.push_slice(&header.encode());
        self.push_slice(bytes);
        Ok(())
    }

    /// Queue a run writing `count` copies of `value` starting at `address`
    ///
    /// A zero count queues nothing.
    pub fn enqueue_repeat(&mut self, address: u16, value: u8, count: usize) -> Result<(), StorageError> {
        if count == 0 {
            return Ok(());
        }
        let header = RunHeader::new(address, count, RunKind::Repeat(value))?;
        self.reserve(HEADER_SIZE)?;

        self.push_slice(&header.encode());
        Ok(())
    }

    /// Take the next run header
    ///
    /// Must only be called at a run boundary; the engine guarantees this by
    /// consuming every payload byte before asking for the next header.
    pub fn pop_header(&mut self) -> Option<RunHeader> {
        if self.len() < HEADER_SIZE {
            return None;
        }
        let mut bytes = [0u8; HEADER_SIZE];
        for slot in bytes.iter_mut() {
            *slot = self.pop_raw();
        }
        Some(RunHeader::decode(bytes))
    }

    /// Take the next literal payload byte
    pub fn pop_byte(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        Some(self.pop_raw())
    }

    fn reserve(&self, total: usize) -> Result<(), StorageError> {
        if total > N {
            return Err(StorageError::RunTooLarge);
        }
        if total > self.remaining {
            return Err(StorageError::BufferOverflow);
        }
        Ok(())
    }

    /// Caller has checked `remaining`
    fn push_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.data[self.head] = byte;
            self.head = (self.head + 1) % N;
        }
        self.remaining -= bytes.len();
    }

    /// Caller has checked the buffer is not empty
    fn pop_raw(&mut self) -> u8 {
        let byte = self.data[self.tail];
        self.tail = (self.tail + 1) % N;
        self.remaining += 1;
        byte
    }
}
