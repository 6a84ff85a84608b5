//! Asynchronous write engine
//!
//! Drains the [`WriteBuffer`] into [`RawMemory`] one byte per tick. The
//! tick never waits: if the memory is still programming the previous byte
//! the tick returns immediately.
//!
//! ```text
//!        ┌──────────── buffer empty ────────────┐
//!        ▼                                      │
//!     ┌──────┐  header popped  ┌────────────┐   │
//!     │ IDLE │ ──────────────► │  DRAINING  │ ──┘ last byte started
//!     └──────┘                 └────────────┘
//!        │ (once)                 │  ▲
//!        ▼                        └──┘ one byte per tick
//!     protect()
//! ```
//!
//! Loading a header takes a tick of its own so a single tick does a
//! bounded amount of work.

use carphone_hal::RawMemory;

use super::buffer::WriteBuffer;
use super::header::{RunHeader, RunKind};
use super::StorageError;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Memory still busy with the previous write
    Busy,
    /// Next run's header loaded
    LoadedRun,
    /// Write started at this address
    Wrote(u16),
    /// Byte at this address already held the value; nothing written
    Skipped(u16),
    /// Nothing queued
    Idle,
}

/// Counters for the lifetime of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    /// Runs accepted into the buffer
    pub runs_enqueued: u32,
    /// Runs rejected (buffer full or run too large)
    pub dropped_runs: u32,
    /// Bytes actually programmed
    pub bytes_written: u32,
    /// Bytes skipped because memory already held the value
    pub bytes_skipped: u32,
}

/// The run currently being drained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveRun {
    address: u16,
    remaining: u16,
    kind: RunKind,
}

impl From<RunHeader> for ActiveRun {
    fn from(header: RunHeader) -> Self {
        Self {
            address: header.address,
            remaining: header.length,
            kind: header.kind,
        }
    }
}

/// Write buffer plus the state of the run being drained
#[derive(Debug, Clone)]
pub struct WriteEngine<const N: usize> {
    buffer: WriteBuffer<N>,
    active: Option<ActiveRun>,
    /// Memory has been put into write-protect since the last write
    protected: bool,
    stats: EngineStats,
}

impl<const N: usize> Default for WriteEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> WriteEngine<N> {
    /// Create an idle engine with an empty buffer
    pub const fn new() -> Self {
        Self {
            buffer: WriteBuffer::new(),
            active: None,
            protected: false,
            stats: EngineStats {
                runs_enqueued: 0,
                dropped_runs: 0,
                bytes_written: 0,
                bytes_skipped: 0,
            },
        }
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &WriteBuffer<N> {
        &self.buffer
    }

    /// Lifetime counters
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Check whether a run is being drained
    pub fn has_active_run(&self) -> bool {
        self.active.is_some()
    }

    /// Check whether any work is queued or in progress
    pub fn has_pending_work(&self) -> bool {
        self.active.is_some() || !self.buffer.is_empty()
    }

    /// Discard all queued runs and the active one
    ///
    /// There is no way to cancel a single run; this is only used when the
    /// whole memory is about to be reformatted.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.active = None;
        self.protected = false;
    }

    /// Queue a literal run (fail-fast, never blocks)
    pub fn enqueue_literal(&mut self, address: u16, bytes: &[u8]) -> Result<(), StorageError> {
        let result = self.buffer.enqueue_literal(address, bytes);
        self.account(address, result)
    }

    /// Queue a repeated-byte run (fail-fast, never blocks)
    pub fn enqueue_repeat(&mut self, address: u16, value: u8, count: usize) -> Result<(), StorageError> {
        let result = self.buffer.enqueue_repeat(address, value, count);
        self.account(address, result)
    }

    /// Count a run that was refused before reaching the buffer
    pub fn reject(&mut self, address: u16, error: StorageError) -> Result<(), StorageError> {
        self.account(address, Err(error))
    }

    #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
    fn account(&mut self, address: u16, result: Result<(), StorageError>) -> Result<(), StorageError> {
        match result {
            Ok(()) => self.stats.runs_enqueued = self.stats.runs_enqueued.saturating_add(1),
            Err(e) => {
                self.stats.dropped_runs = self.stats.dropped_runs.saturating_add(1);
                #[cfg(feature = "defmt")]
                defmt::warn!("Dropped write run at {=u16}: {:?}", address, e);
            }
        }
        result
    }

    /// Advance the engine by one step
    ///
    /// Call on every iteration of the main loop.
    pub fn tick<M: RawMemory>(&mut self, memory: &mut M) -> TickOutcome {
        if memory.is_write_in_progress() {
            return TickOutcome::Busy;
        }

        if let Some(run) = self.active.as_mut() {
            let value = match run.kind {
                RunKind::Repeat(value) => Some(value),
                RunKind::Literal => self.buffer.pop_byte(),
            };
            let Some(value) = value else {
                // Literal payload always follows its header; drop a run without one
                self.active = None;
                return TickOutcome::Idle;
            };

            let address = run.address;
            run.address = run.address.wrapping_add(1);
            run.remaining -= 1;
            if run.remaining == 0 {
                self.active = None;
            }

            self.protected = false;
            return if memory.try_start_write(address, value) {
                self.stats.bytes_written = self.stats.bytes_written.saturating_add(1);
                TickOutcome::Wrote(address)
            } else {
                self.stats.bytes_skipped = self.stats.bytes_skipped.saturating_add(1);
                TickOutcome::Skipped(address)
            };
        }

        if let Some(header) = self.buffer.pop_header() {
            self.active = Some(ActiveRun::from(header));
            return TickOutcome::LoadedRun;
        }

        if !self.protected {
            #[cfg(feature = "defmt")]
            defmt::trace!("Write engine idle, protecting memory");
            memory.protect();
            self.protected = true;
        }
        TickOutcome::Idle
    }

    /// Check whether everything queued has reached the memory
    pub fn is_done_writing<M: RawMemory>(&self, memory: &mut M) -> bool {
        !self.has_pending_work() && !memory.is_write_in_progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carphone_hal::MockMemory;

    fn drain<M: RawMemory, const N: usize>(engine: &mut WriteEngine<N>, memory: &mut M) -> usize {
        let mut ticks = 0;
        while !engine.is_done_writing(memory) {
            engine.tick(memory);
            ticks += 1;
            assert!(ticks < 10_000, "engine did not drain");
        }
        ticks
    }

    #[test]
    fn test_fifo_drain_order() {
        let mut memory = MockMemory::<64>::from_image(&[0u8; 64]);
        let mut engine = WriteEngine::<64>::new();

        engine.enqueue_literal(10, &[1, 2, 3]).unwrap();
        engine.enqueue_repeat(50, 0xFF, 2).unwrap();
        drain(&mut engine, &mut memory);

        assert_eq!(memory.write_log(), &[10, 11, 12, 50, 51]);
        assert_eq!(&memory.cells()[10..13], &[1, 2, 3]);
        assert_eq!(&memory.cells()[50..52], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_tick_sequence() {
        let mut memory = MockMemory::<64>::from_image(&[0u8; 64]);
        let mut engine = WriteEngine::<64>::new();
        engine.enqueue_literal(5, &[7, 8]).unwrap();

        assert_eq!(engine.tick(&mut memory), TickOutcome::LoadedRun);
        assert_eq!(engine.tick(&mut memory), TickOutcome::Wrote(5));
        assert_eq!(engine.tick(&mut memory), TickOutcome::Wrote(6));
        assert!(!engine.has_active_run());
        assert_eq!(engine.tick(&mut memory), TickOutcome::Idle);
    }

    #[test]
    fn test_yields_while_memory_busy() {
        let mut memory = MockMemory::<64>::from_image(&[0u8; 64]);
        memory.set_write_latency(2);
        let mut engine = WriteEngine::<64>::new();
        engine.enqueue_literal(0, &[1, 2]).unwrap();

        assert_eq!(engine.tick(&mut memory), TickOutcome::LoadedRun);
        assert_eq!(engine.tick(&mut memory), TickOutcome::Wrote(0));
        assert_eq!(engine.tick(&mut memory), TickOutcome::Busy);
        assert_eq!(engine.tick(&mut memory), TickOutcome::Busy);
        assert_eq!(engine.tick(&mut memory), TickOutcome::Wrote(1));
        assert_eq!(memory.overlapped_writes(), 0);
    }

    #[test]
    fn test_skips_unchanged_bytes() {
        let mut memory = MockMemory::<64>::new();
        let mut engine = WriteEngine::<64>::new();
        engine.enqueue_literal(0, &[0xFF, 0x01, 0xFF]).unwrap();
        drain(&mut engine, &mut memory);

        assert_eq!(memory.write_log(), &[1]);
        let stats = engine.stats();
        assert_eq!(stats.bytes_written, 1);
        assert_eq!(stats.bytes_skipped, 2);
    }

    #[test]
    fn test_later_run_wins() {
        let mut memory = MockMemory::<64>::new();
        let mut engine = WriteEngine::<64>::new();
        engine.enqueue_repeat(3, 0x11, 1).unwrap();
        engine.enqueue_repeat(3, 0x22, 1).unwrap();
        drain(&mut engine, &mut memory);
        assert_eq!(memory.cells()[3], 0x22);
    }

    #[test]
    fn test_protects_once_when_idle() {
        let mut memory = MockMemory::<16>::new();
        let mut engine = WriteEngine::<16>::new();

        assert_eq!(engine.tick(&mut memory), TickOutcome::Idle);
        assert_eq!(engine.tick(&mut memory), TickOutcome::Idle);
        assert_eq!(memory.protect_calls(), 1);

        engine.enqueue_repeat(0, 0, 1).unwrap();
        drain(&mut engine, &mut memory);
        engine.tick(&mut memory);
        assert_eq!(memory.protect_calls(), 2);
        assert!(memory.is_protected());
    }

    #[test]
    fn test_done_writing_waits_for_memory() {
        let mut memory = MockMemory::<16>::with_write_latency(1);
        let mut engine = WriteEngine::<16>::new();
        engine.enqueue_repeat(0, 0, 1).unwrap();
        engine.tick(&mut memory);
        engine.tick(&mut memory);

        assert!(!engine.has_pending_work());
        // One busy poll left
        assert!(!engine.is_done_writing(&mut memory));
        assert!(engine.is_done_writing(&mut memory));
    }

    #[test]
    fn test_dropped_runs_are_counted() {
        let mut engine = WriteEngine::<8>::new();
        engine.enqueue_literal(0, &[1, 2, 3, 4]).unwrap();
        assert_eq!(
            engine.enqueue_repeat(0, 0, 1),
            Err(StorageError::BufferOverflow)
        );
        assert_eq!(
            engine.enqueue_literal(0, &[0; 5]),
            Err(StorageError::RunTooLarge)
        );
        let stats = engine.stats();
        assert_eq!(stats.runs_enqueued, 1);
        assert_eq!(stats.dropped_runs, 2);
    }

    #[test]
    fn test_reset_discards_pending_runs() {
        let mut memory = MockMemory::<16>::new();
        let mut engine = WriteEngine::<16>::new();
        engine.enqueue_repeat(0, 0, 4).unwrap();
        engine.tick(&mut memory);
        assert!(engine.has_active_run());

        engine.reset();
        assert!(engine.is_done_writing(&mut memory));
        assert_eq!(engine.tick(&mut memory), TickOutcome::Idle);
        assert!(memory.write_log().is_empty());
    }
}
