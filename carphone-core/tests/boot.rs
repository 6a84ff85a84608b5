//! Boot-time loading and format recovery

use carphone_core::config::{FactoryDefaults, DIRECTORY_SIZE, STORAGE_MARKER, STORAGE_VERSION};
use carphone_core::storage::{layout, BootOutcome, Storage};
use carphone_hal::MockMemory;

type TestStorage = Storage<MockMemory<1024>>;

fn boot(memory: MockMemory<1024>) -> (TestStorage, BootOutcome) {
    let mut storage = Storage::new(memory, FactoryDefaults::DEFAULT);
    let outcome = storage.load();
    (storage, outcome)
}

fn seeded_slots() -> impl Iterator<Item = usize> {
    FactoryDefaults::DEFAULT
        .directory_seed
        .into_iter()
        .map(|seed| seed.index as usize)
}

#[test]
fn test_corrupt_marker_restores_defaults_and_seeds() {
    let (storage, _) = boot(MockMemory::new());
    let mut memory = storage.release();

    // Fill every directory slot, then break the marker
    for slot in 0..DIRECTORY_SIZE {
        let entry = layout::DIRECTORY.get(slot).unwrap();
        memory.cells_mut()[entry.range()].fill(0x12);
    }
    memory.cells_mut()[0] = 0x00;

    let (storage, outcome) = boot(memory);
    assert_eq!(outcome, BootOutcome::FactoryReset);

    let record = storage.record();
    for slot in 0..DIRECTORY_SIZE {
        let seeded = seeded_slots().any(|s| s == slot);
        assert_eq!(record.is_directory_entry_empty(slot), !seeded, "slot {slot}");
    }
    for seed in FactoryDefaults::DEFAULT.directory_seed {
        let slot = seed.index as usize;
        assert_eq!(record.directory_name(slot).as_str(), seed.name);
        assert_eq!(record.directory_number(slot).as_str(), seed.number);
    }

    // Memory matches the mirror byte for byte
    let cells = storage.memory().cells();
    assert_eq!(&cells[..layout::RECORD_SIZE], &record.as_bytes()[..]);
}

#[test]
fn test_version_mismatch_is_a_format_mismatch() {
    let (storage, _) = boot(MockMemory::new());
    let mut memory = storage.release();
    memory.cells_mut()[1] = STORAGE_VERSION.wrapping_add(1);

    let (storage, outcome) = boot(memory);
    assert_eq!(outcome, BootOutcome::FactoryReset);
    assert_eq!(storage.memory().cells()[0], STORAGE_MARKER);
    assert_eq!(storage.memory().cells()[1], STORAGE_VERSION);
}

#[test]
fn test_compatible_memory_is_not_rewritten() {
    let (storage, _) = boot(MockMemory::new());
    let mut memory = storage.release();
    memory.clear_write_log();

    let (storage, outcome) = boot(memory);
    assert_eq!(outcome, BootOutcome::Loaded);
    assert!(storage.memory().write_log().is_empty());
    assert_eq!(storage.index().len(), 6);
}

#[test]
fn test_sorted_index_after_boot() {
    let (storage, _) = boot(MockMemory::new());
    let record = storage.record();
    let names: Vec<_> = storage
        .index()
        .as_slice()
        .iter()
        .map(|&slot| record.directory_name(slot as usize))
        .collect();

    for pair in names.windows(2) {
        assert!(pair[0].to_ascii_lowercase() <= pair[1].to_ascii_lowercase());
    }
}

#[test]
fn test_factory_reset_after_use() {
    let (mut storage, _) = boot(MockMemory::new());
    storage.set_directory_entry(10, Some("5551000"), Some("Temp")).unwrap();
    storage.set_lcd_view_angle(15).unwrap();
    storage.flush();

    storage.factory_reset();
    assert!(storage.record().is_directory_entry_empty(10));
    assert_eq!(
        storage.record().lcd_view_angle(),
        FactoryDefaults::DEFAULT.lcd_view_angle
    );

    let (reloaded, outcome) = boot(storage.release());
    assert_eq!(outcome, BootOutcome::Loaded);
    assert!(reloaded.record().is_directory_entry_empty(10));
}
