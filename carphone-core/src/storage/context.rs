//! The storage context
//!
//! [`Storage`] owns the memory driver, the write engine, the in-memory
//! record and the directory index. The application creates exactly one and
//! hands it to whatever needs settings; the main loop calls
//! [`Storage::tick`] on every iteration.

use carphone_hal::RawMemory;

use super::blocking;
use super::directory::SortedNameIndex;
use super::engine::{EngineStats, TickOutcome, WriteEngine};
use super::layout::{self, Field, RECORD_SIZE};
use super::record::StorageRecord;
use super::StorageError;
use crate::codec::number;
use crate::config::{FactoryDefaults, WRITE_BUFFER_CAPACITY};

/// How [`Storage::load`] found the memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootOutcome {
    /// Stored record was compatible and is now the mirror
    Loaded,
    /// Marker or version mismatched; memory was reformatted with defaults
    FactoryReset,
    /// Memory cannot hold the record; running from defaults, nothing persists
    MemoryTooSmall,
}

/// Persistent settings backed by `M`, with an `N`-byte write buffer
pub struct Storage<M, const N: usize = WRITE_BUFFER_CAPACITY> {
    memory: M,
    engine: WriteEngine<N>,
    pub(super) record: StorageRecord,
    pub(super) index: SortedNameIndex,
    defaults: FactoryDefaults,
}

impl<M: RawMemory, const N: usize> Storage<M, N> {
    /// Create a context holding factory defaults
    ///
    /// Nothing is read from or written to `memory` until [`load`](Self::load).
    pub fn new(memory: M, defaults: FactoryDefaults) -> Self {
        let record = StorageRecord::factory(&defaults);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        Self {
            memory,
            engine: WriteEngine::new(),
            record,
            index,
            defaults,
        }
    }

    /// Read the stored record, reformatting the memory if it is incompatible
    ///
    /// Blocks for the duration of the read (and the format, if any). Call
    /// once at boot before the main loop starts ticking.
    pub fn load(&mut self) -> BootOutcome {
        self.engine.reset();

        if !self.memory_fits() {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "Memory holds {=usize} bytes, record needs {=usize}; settings will not persist",
                self.memory.size(),
                RECORD_SIZE
            );
            self.restore_defaults();
            return BootOutcome::MemoryTooSmall;
        }

        let mut bytes = [0u8; RECORD_SIZE];
        blocking::read_bytes(&mut self.memory, 0, &mut bytes);
        let stored = StorageRecord::from_bytes(bytes);

        if stored.is_compatible() {
            self.record = stored;
            self.index.rebuild(&self.record);
            #[cfg(feature = "defmt")]
            defmt::info!("Storage loaded, {=usize} named directory entries", self.index.len());
            return BootOutcome::Loaded;
        }

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "Storage format mismatch (marker {=u8:#x}, version {=u8}), restoring defaults",
            stored.marker(),
            stored.version()
        );
        self.format();
        BootOutcome::FactoryReset
    }

    /// Discard pending writes and restore factory defaults
    ///
    /// Blocks until the memory has been rewritten.
    pub fn factory_reset(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::info!("Factory reset requested");
        if self.memory_fits() {
            self.format();
        } else {
            self.engine.reset();
            self.restore_defaults();
        }
    }

    fn memory_fits(&self) -> bool {
        self.memory.size() >= RECORD_SIZE
    }

    fn restore_defaults(&mut self) {
        self.record = StorageRecord::factory(&self.defaults);
        self.index.rebuild(&self.record);
    }

    /// Rewrite the whole blob with defaults
    ///
    /// The marker is invalidated first and restored last, so an
    /// interrupted format is detected on the next boot.
    fn format(&mut self) {
        self.engine.reset();
        self.record = StorageRecord::factory(&self.defaults);
        let bytes = self.record.as_bytes();
        let memory = &mut self.memory;

        blocking::write_byte(memory, layout::MARKER.offset, number::EMPTY);

        let settings = Field::at(
            layout::LCD_VIEW_ANGLE.offset,
            layout::DIRECTORY.offset - layout::LCD_VIEW_ANGLE.offset,
        );
        let credit_cards = layout::CREDIT_CARDS.span();
        for region in [settings, credit_cards] {
            blocking::write_bytes(memory, region.offset, &bytes[region.range()]);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("Defaults written, erasing directory");

        for slot in 0..layout::DIRECTORY.count as usize {
            if let Some(entry) = layout::DIRECTORY.get(slot) {
                blocking::fill(memory, entry.offset, number::EMPTY, entry.len as usize);
            }
        }
        for seed in &self.defaults.directory_seed {
            if let Some(entry) = layout::DIRECTORY.get(seed.index as usize) {
                blocking::write_bytes(memory, entry.offset, &bytes[entry.range()]);
            }
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("Directory seeded");

        blocking::write_byte(memory, layout::VERSION.offset, bytes[layout::VERSION.offset as usize]);
        blocking::write_byte(memory, layout::MARKER.offset, bytes[layout::MARKER.offset as usize]);
        blocking::wait_until_idle(memory);

        self.index.rebuild(&self.record);
    }

    /// Queue `field` of the mirror for persistence
    ///
    /// Uniform fields go out as a repeat run (header only). Fields past the
    /// end of the memory are rejected as [`StorageError::InvalidAddress`].
    pub(crate) fn persist(&mut self, field: Field) -> Result<(), StorageError> {
        if field.offset as usize + field.len as usize > self.memory.size() {
            return self.engine.reject(field.offset, StorageError::InvalidAddress);
        }
        let bytes = self.record.field(field);
        match bytes.split_first() {
            Some((&first, rest)) if rest.iter().all(|&b| b == first) => {
                self.engine.enqueue_repeat(field.offset, first, bytes.len())
            }
            Some(_) => self.engine.enqueue_literal(field.offset, bytes),
            None => Ok(()),
        }
    }

    /// Advance the write engine by one step; never blocks
    pub fn tick(&mut self) -> TickOutcome {
        self.engine.tick(&mut self.memory)
    }

    /// Check whether every queued update has reached the memory
    pub fn is_done_writing(&mut self) -> bool {
        self.engine.is_done_writing(&mut self.memory)
    }

    /// Spin on [`tick`](Self::tick) until every queued update is written
    ///
    /// Blocking. Only for orderly power-down and tests.
    pub fn flush(&mut self) {
        while !self.engine.is_done_writing(&mut self.memory) {
            self.engine.tick(&mut self.memory);
        }
    }

    /// The in-memory record; all getters live here
    pub fn record(&self) -> &StorageRecord {
        &self.record
    }

    /// The directory's name index
    pub fn index(&self) -> &SortedNameIndex {
        &self.index
    }

    /// Write engine counters
    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    /// Free bytes in the write buffer
    pub fn buffer_remaining(&self) -> usize {
        self.engine.buffer().remaining()
    }

    /// Defaults used by [`factory_reset`](Self::factory_reset)
    pub fn defaults(&self) -> &FactoryDefaults {
        &self.defaults
    }

    /// The memory driver
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// The memory driver, mutably; bypasses the mirror
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Give back the memory driver; pending writes are lost
    pub fn release(self) -> M {
        self.memory
    }
}
