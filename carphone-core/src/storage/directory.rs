//! Alphabetic index over the directory
//!
//! Derived from the [`StorageRecord`] and never persisted. Holds the slots
//! of every named, non-empty entry ordered by case-insensitive name, with
//! equal names kept in slot order.

use core::cmp::Ordering;

use heapless::Vec;

use super::layout;
use super::record::StorageRecord;
use crate::config::DIRECTORY_SIZE;

/// Directory slots in name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedNameIndex {
    order: Vec<u8, DIRECTORY_SIZE>,
}

impl SortedNameIndex {
    /// Create an empty index
    pub const fn new() -> Self {
        Self { order: Vec::new() }
    }

    /// Recompute the index from `record`
    pub fn rebuild(&mut self, record: &StorageRecord) {
        self.order.clear();
        for slot in 0..DIRECTORY_SIZE {
            if record.is_directory_entry_named(slot) {
                // Capacity equals the directory size
                let _ = self.order.push(slot as u8);
            }
        }
        self.order.sort_unstable_by(|&a, &b| {
            compare_names(name_bytes(record, a), name_bytes(record, b)).then(a.cmp(&b))
        });
    }

    /// Slots in name order
    pub fn as_slice(&self) -> &[u8] {
        &self.order
    }

    /// Number of named entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether no entry has a name
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check whether `slot` is indexed
    pub fn contains(&self, slot: u8) -> bool {
        self.position(slot).is_some()
    }

    /// Position of `slot` in name order
    pub fn position(&self, slot: u8) -> Option<usize> {
        self.order.iter().position(|&s| s == slot)
    }

    /// Slot after (or before) `slot` in name order, wrapping around
    pub fn next(&self, slot: u8, forward: bool) -> Option<u8> {
        let position = self.position(slot)?;
        let len = self.order.len();
        let next = if forward {
            (position + 1) % len
        } else {
            (position + len - 1) % len
        };
        self.order.get(next).copied()
    }

    /// First slot whose lowercased initial is at or after `letter`
    ///
    /// Falls back to the first slot in name order.
    pub fn first_for_letter(&self, record: &StorageRecord, letter: u8) -> Option<u8> {
        let letter = letter.to_ascii_lowercase();
        self.order
            .iter()
            .copied()
            .find(|&slot| {
                name_bytes(record, slot)
                    .first()
                    .map_or(false, |initial| initial.to_ascii_lowercase() >= letter)
            })
            .or_else(|| self.order.first().copied())
    }
}

/// Stored name of `slot` up to its terminator
fn name_bytes(record: &StorageRecord, slot: u8) -> &[u8] {
    let Some(field) = layout::directory_name(slot as usize) else {
        return &[];
    };
    let bytes = record.field(field);
    let len = bytes
        .iter()
        .position(|b| !(0x20..=0x7E).contains(b))
        .unwrap_or(bytes.len());
    &bytes[..len]
}

fn compare_names(a: &[u8], b: &[u8]) -> Ordering {
    a.iter()
        .map(u8::to_ascii_lowercase)
        .cmp(b.iter().map(u8::to_ascii_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(names: &[(usize, &str)]) -> StorageRecord {
        let mut record = StorageRecord::erased();
        for &(slot, name) in names {
            record.set_directory_entry(slot, Some("1"), Some(name)).unwrap();
        }
        record
    }

    #[test]
    fn test_equal_names_keep_slot_order() {
        let record = record_with(&[(0, "Bob"), (1, "alice"), (2, "Bob")]);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        assert_eq!(index.as_slice(), &[1, 0, 2]);
    }

    #[test]
    fn test_case_insensitive_order() {
        let record = record_with(&[(5, "zed"), (9, "Amy"), (2, "bert"), (7, "ALAN")]);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        assert_eq!(index.as_slice(), &[7, 9, 2, 5]);
    }

    #[test]
    fn test_prefix_sorts_first() {
        let record = record_with(&[(0, "Anna"), (1, "Ann")]);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        assert_eq!(index.as_slice(), &[1, 0]);
    }

    #[test]
    fn test_skips_unnamed_and_empty() {
        let mut record = record_with(&[(0, "Kim"), (1, ""), (3, "Lee")]);
        record.set_directory_entry(3, None, None).unwrap();
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        assert_eq!(index.as_slice(), &[0]);
        assert!(!index.contains(1));
        assert!(!index.contains(3));
    }

    #[test]
    fn test_next_wraps_both_ways() {
        let record = record_with(&[(4, "a"), (2, "b"), (8, "c")]);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);

        assert_eq!(index.next(4, true), Some(2));
        assert_eq!(index.next(8, true), Some(4));
        assert_eq!(index.next(4, false), Some(8));
        assert_eq!(index.next(3, true), None);
    }

    #[test]
    fn test_single_entry_is_its_own_neighbour() {
        let record = record_with(&[(6, "Solo")]);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        assert_eq!(index.next(6, true), Some(6));
        assert_eq!(index.next(6, false), Some(6));
    }

    #[test]
    fn test_first_for_letter() {
        let record = record_with(&[(0, "Dan"), (1, "bea"), (2, "Fay")]);
        let mut index = SortedNameIndex::new();
        index.rebuild(&record);

        assert_eq!(index.first_for_letter(&record, b'a'), Some(1));
        assert_eq!(index.first_for_letter(&record, b'C'), Some(0));
        assert_eq!(index.first_for_letter(&record, b'e'), Some(2));
        assert_eq!(index.first_for_letter(&record, b'g'), Some(1));
        assert_eq!(SortedNameIndex::new().first_for_letter(&record, b'a'), None);
    }
}
