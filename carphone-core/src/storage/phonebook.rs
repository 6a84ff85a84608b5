//! Phone numbers and the directory
//!
//! Numbers are stored packed (see [`codec::number`](crate::codec::number));
//! an empty slot reads back as an empty string. Directory mutations rebuild
//! the [`SortedNameIndex`](super::SortedNameIndex) before returning.

use carphone_hal::RawMemory;
use heapless::String;

use super::context::Storage;
use super::layout::{self, Field, DIRECTORY_NUMBER_LEN};
use super::record::StorageRecord;
use super::StorageError;
use crate::codec::{self, number, text, NumberString};
use crate::config::{
    CREDIT_CARD_SYMBOLS, DIRECTORY_NAME_LEN, DIRECTORY_NUMBER_SYMBOLS, DIRECTORY_SIZE,
    LAST_DIALED_SYMBOLS, MAX_NUMBER_SYMBOLS, NO_ENTRY, OWN_NUMBER_SYMBOLS, SPEED_DIAL_SYMBOLS,
};

/// Name stored in a directory entry
pub type DirectoryName = String<DIRECTORY_NAME_LEN>;

const ENTRY_LEN: usize = layout::DIRECTORY.stride as usize;

impl StorageRecord {
    fn number(&self, field: Option<Field>, max_symbols: usize) -> NumberString {
        field.map_or_else(String::new, |f| codec::uncompress(self.field(f), max_symbols))
    }

    pub(crate) fn set_number(
        &mut self,
        field: Field,
        max_symbols: usize,
        number: Option<&str>,
    ) -> Result<Field, StorageError> {
        let mut packed = [0u8; codec::packed_len(MAX_NUMBER_SYMBOLS)];
        let len = codec::compress(number, max_symbols, &mut packed)
            .map_err(|_| StorageError::InvalidArgument)?;
        self.field_mut(field).copy_from_slice(&packed[..len]);
        Ok(field)
    }

    /// Own number `index`
    pub fn own_number(&self, index: usize) -> NumberString {
        self.number(layout::OWN_NUMBERS.get(index), OWN_NUMBER_SYMBOLS)
    }

    /// The currently active own number
    pub fn active_own_number(&self) -> NumberString {
        self.own_number(self.active_own_number_index() as usize)
    }

    pub(crate) fn set_own_number(&mut self, index: usize, number: Option<&str>) -> Result<Field, StorageError> {
        let field = layout::OWN_NUMBERS.get(index).ok_or(StorageError::InvalidArgument)?;
        self.set_number(field, OWN_NUMBER_SYMBOLS, number)
    }

    /// Last number dialed
    pub fn last_dialed_number(&self) -> NumberString {
        self.number(Some(layout::LAST_DIALED), LAST_DIALED_SYMBOLS)
    }

    pub(crate) fn set_last_dialed_number(&mut self, number: Option<&str>) -> Result<Field, StorageError> {
        self.set_number(layout::LAST_DIALED, LAST_DIALED_SYMBOLS, number)
    }

    /// Speed dial slot `index`
    pub fn speed_dial_number(&self, index: usize) -> NumberString {
        self.number(layout::SPEED_DIAL.get(index), SPEED_DIAL_SYMBOLS)
    }

    pub(crate) fn set_speed_dial_number(&mut self, index: usize, number: Option<&str>) -> Result<Field, StorageError> {
        let field = layout::SPEED_DIAL.get(index).ok_or(StorageError::InvalidArgument)?;
        self.set_number(field, SPEED_DIAL_SYMBOLS, number)
    }

    /// Credit card number `index`
    pub fn credit_card_number(&self, index: usize) -> NumberString {
        self.number(layout::CREDIT_CARDS.get(index), CREDIT_CARD_SYMBOLS)
    }

    pub(crate) fn set_credit_card_number(&mut self, index: usize, number: Option<&str>) -> Result<Field, StorageError> {
        let field = layout::CREDIT_CARDS.get(index).ok_or(StorageError::InvalidArgument)?;
        self.set_number(field, CREDIT_CARD_SYMBOLS, number)
    }

    /// Number of directory entry `index`
    pub fn directory_number(&self, index: usize) -> NumberString {
        self.number(layout::directory_number(index), DIRECTORY_NUMBER_SYMBOLS)
    }

    /// Name of directory entry `index`
    pub fn directory_name(&self, index: usize) -> DirectoryName {
        layout::directory_name(index)
            .map_or_else(String::new, |f| text::decode_text(self.field(f)))
    }

    /// Check whether directory slot `index` is free
    ///
    /// Out-of-range indices count as empty.
    pub fn is_directory_entry_empty(&self, index: usize) -> bool {
        layout::directory_number(index).map_or(true, |f| number::is_empty(self.field(f)))
    }

    /// Check whether directory entry `index` is in use and has a name
    pub fn is_directory_entry_named(&self, index: usize) -> bool {
        if self.is_directory_entry_empty(index) {
            return false;
        }
        layout::directory_name(index)
            .and_then(|f| self.field(f).first().copied())
            .map_or(false, |first| (0x20..=0x7E).contains(&first))
    }

    /// Write or clear directory entry `index`
    ///
    /// `number: None` clears the whole entry. A missing name is stored as
    /// an empty one. Nothing changes if either part fails to encode.
    pub(crate) fn set_directory_entry(
        &mut self,
        index: usize,
        number: Option<&str>,
        name: Option<&str>,
    ) -> Result<Field, StorageError> {
        let entry = layout::DIRECTORY.get(index).ok_or(StorageError::InvalidArgument)?;

        let Some(number) = number else {
            self.field_mut(entry).fill(number::EMPTY);
            return Ok(entry);
        };

        let mut bytes = [0u8; ENTRY_LEN];
        let (number_bytes, name_bytes) = bytes.split_at_mut(DIRECTORY_NUMBER_LEN);
        codec::compress(Some(number), DIRECTORY_NUMBER_SYMBOLS, number_bytes)
            .map_err(|_| StorageError::InvalidArgument)?;
        text::encode_text(name.unwrap_or(""), name_bytes)
            .map_err(|_| StorageError::InvalidArgument)?;

        self.field_mut(entry).copy_from_slice(&bytes);
        Ok(entry)
    }
}

impl<M: RawMemory, const N: usize> Storage<M, N> {
    /// Set own number `index` (`None` clears it)
    pub fn set_own_number(&mut self, index: usize, number: Option<&str>) -> Result<(), StorageError> {
        let field = self.record.set_own_number(index, number)?;
        self.persist(field)
    }

    /// Set the last dialed number (`None` clears it)
    pub fn set_last_dialed_number(&mut self, number: Option<&str>) -> Result<(), StorageError> {
        let field = self.record.set_last_dialed_number(number)?;
        self.persist(field)
    }

    /// Set speed dial slot `index` (`None` clears it)
    pub fn set_speed_dial_number(&mut self, index: usize, number: Option<&str>) -> Result<(), StorageError> {
        let field = self.record.set_speed_dial_number(index, number)?;
        self.persist(field)
    }

    /// Set credit card number `index` (`None` clears it)
    pub fn set_credit_card_number(&mut self, index: usize, number: Option<&str>) -> Result<(), StorageError> {
        let field = self.record.set_credit_card_number(index, number)?;
        self.persist(field)
    }

    /// Write or clear directory entry `index` and rebuild the name index
    pub fn set_directory_entry(
        &mut self,
        index: usize,
        number: Option<&str>,
        name: Option<&str>,
    ) -> Result<(), StorageError> {
        let entry = self.record.set_directory_entry(index, number, name)?;
        self.index.rebuild(&self.record);
        self.persist(entry)
    }

    /// Check whether directory slot `index` is free
    pub fn is_directory_entry_empty(&self, index: usize) -> bool {
        self.record.is_directory_entry_empty(index)
    }

    /// Number of occupied directory slots
    pub fn directory_entry_count(&self) -> usize {
        (0..DIRECTORY_SIZE)
            .filter(|&i| !self.record.is_directory_entry_empty(i))
            .count()
    }

    /// Lowest free directory slot, or [`NO_ENTRY`] when the directory is full
    pub fn first_empty_index(&self) -> u8 {
        (0..DIRECTORY_SIZE)
            .find(|&i| self.record.is_directory_entry_empty(i))
            .map_or(NO_ENTRY, |i| i as u8)
    }

    /// Next occupied slot after `start` in slot order, wrapping around
    ///
    /// With `start` out of range the search begins at the first (forward)
    /// or last (backward) slot inclusive. Returns `start` itself when it is
    /// the only occupied slot and [`NO_ENTRY`] when the directory is empty.
    pub fn next_populated_index(&self, start: u8, forward: bool) -> u8 {
        let size = DIRECTORY_SIZE;
        let start = start as usize;
        let mut candidates = (1..=size).map(|step| {
            if start >= size {
                if forward { step - 1 } else { size - step }
            } else if forward {
                (start + step) % size
            } else {
                (start + size - step) % size
            }
        });

        candidates
            .find(|&i| !self.record.is_directory_entry_empty(i))
            .map_or(NO_ENTRY, |i| i as u8)
    }

    /// Neighbour of `start` in name order, wrapping around
    ///
    /// Returns [`NO_ENTRY`] if `start` is not a named entry.
    pub fn next_named_index(&self, start: u8, forward: bool) -> u8 {
        self.index.next(start, forward).unwrap_or(NO_ENTRY)
    }

    /// First named entry whose name starts at or after `letter`
    ///
    /// Case-insensitive. Wraps to the first entry in name order when no
    /// name qualifies; [`NO_ENTRY`] when no entry has a name.
    pub fn first_named_index_for_letter(&self, letter: u8) -> u8 {
        self.index
            .first_for_letter(&self.record, letter)
            .unwrap_or(NO_ENTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryDefaults;
    use crate::storage::SortedNameIndex;
    use carphone_hal::MockMemory;

    type TestStorage = Storage<MockMemory<1024>>;

    fn empty_directory() -> TestStorage {
        let mut storage = Storage::new(MockMemory::new(), FactoryDefaults::DEFAULT);
        storage.load();
        for i in 0..DIRECTORY_SIZE {
            storage.set_directory_entry(i, None, None).unwrap();
            storage.flush();
        }
        storage
    }

    #[test]
    fn test_number_setters_round_trip() {
        let mut record = StorageRecord::factory(&FactoryDefaults::DEFAULT);
        record.set_own_number(1, Some("5551234567")).unwrap();
        record.set_speed_dial_number(2, Some("*86#")).unwrap();
        record.set_credit_card_number(5, Some("4111111111111111")).unwrap();
        record.set_last_dialed_number(Some("18005551212P1234")).unwrap();

        assert_eq!(record.own_number(1).as_str(), "5551234567");
        assert_eq!(record.speed_dial_number(2).as_str(), "*86#");
        assert_eq!(record.credit_card_number(5).as_str(), "4111111111111111");
        assert_eq!(record.last_dialed_number().as_str(), "18005551212P1234");
        assert_eq!(record.own_number(0).as_str(), "");
        assert_eq!(record.own_number(7).as_str(), "");
    }

    #[test]
    fn test_own_number_keeps_trailing_digits() {
        let mut record = StorageRecord::factory(&FactoryDefaults::DEFAULT);
        record.set_own_number(0, Some("1234567890123")).unwrap();
        assert_eq!(record.own_number(0).as_str(), "4567890123");
    }

    #[test]
    fn test_invalid_number_is_rejected_untouched() {
        let mut record = StorageRecord::factory(&FactoryDefaults::DEFAULT);
        record.set_speed_dial_number(0, Some("123")).unwrap();
        assert_eq!(
            record.set_speed_dial_number(0, Some("12-34")),
            Err(StorageError::InvalidArgument)
        );
        assert_eq!(
            record.set_speed_dial_number(3, Some("1")),
            Err(StorageError::InvalidArgument)
        );
        assert_eq!(record.speed_dial_number(0).as_str(), "123");
    }

    #[test]
    fn test_directory_entry_states() {
        let mut record = StorageRecord::erased();
        assert!(record.is_directory_entry_empty(4));
        assert!(record.is_directory_entry_empty(DIRECTORY_SIZE));

        record.set_directory_entry(4, Some("555"), None).unwrap();
        assert!(!record.is_directory_entry_empty(4));
        assert!(!record.is_directory_entry_named(4));

        record.set_directory_entry(4, Some("555"), Some("Garage")).unwrap();
        assert!(record.is_directory_entry_named(4));
        assert_eq!(record.directory_name(4).as_str(), "Garage");
        assert_eq!(record.directory_number(4).as_str(), "555");

        let entry = record.set_directory_entry(4, None, Some("ignored")).unwrap();
        assert!(record.field(entry).iter().all(|&b| b == number::EMPTY));
        assert_eq!(record.directory_name(4).as_str(), "");
    }

    #[test]
    fn test_unprintable_first_name_byte_is_unnamed() {
        let mut record = StorageRecord::erased();
        record.set_directory_entry(7, Some("555"), Some("Shop")).unwrap();
        let Some(name) = layout::directory_name(7) else {
            panic!("slot 7 has no name field");
        };

        record.field_mut(name)[0] = number::EMPTY;
        assert!(!record.is_directory_entry_empty(7));
        assert!(!record.is_directory_entry_named(7));

        record.field_mut(name)[0] = 0x07;
        assert!(!record.is_directory_entry_named(7));

        let mut index = SortedNameIndex::new();
        index.rebuild(&record);
        assert!(!index.contains(7));
    }

    #[test]
    fn test_directory_name_fills_field() {
        let mut record = StorageRecord::erased();
        record
            .set_directory_entry(0, Some("1"), Some("Grandparents"))
            .unwrap();
        assert_eq!(record.directory_name(0).as_str(), "Grandparen");
    }

    #[test]
    fn test_bad_name_leaves_entry_untouched() {
        let mut record = StorageRecord::erased();
        record.set_directory_entry(3, Some("1"), Some("Ann")).unwrap();
        assert!(record.set_directory_entry(3, Some("2"), Some("Ann\n")).is_err());
        assert_eq!(record.directory_number(3).as_str(), "1");
    }

    #[test]
    fn test_first_empty_and_count() {
        let mut storage = empty_directory();
        assert_eq!(storage.first_empty_index(), 0);
        assert_eq!(storage.directory_entry_count(), 0);

        storage.set_directory_entry(0, Some("1"), Some("A")).unwrap();
        storage.set_directory_entry(1, Some("2"), Some("B")).unwrap();
        assert_eq!(storage.first_empty_index(), 2);
        assert_eq!(storage.directory_entry_count(), 2);

        for i in 2..DIRECTORY_SIZE {
            storage.set_directory_entry(i, Some("3"), None).unwrap();
            storage.flush();
        }
        assert_eq!(storage.first_empty_index(), NO_ENTRY);
    }

    #[test]
    fn test_next_populated_wraps() {
        let mut storage = empty_directory();
        assert_eq!(storage.next_populated_index(0, true), NO_ENTRY);

        storage.set_directory_entry(3, Some("1"), None).unwrap();
        storage.set_directory_entry(20, Some("2"), None).unwrap();

        assert_eq!(storage.next_populated_index(3, true), 20);
        assert_eq!(storage.next_populated_index(20, true), 3);
        assert_eq!(storage.next_populated_index(3, false), 20);
        assert_eq!(storage.next_populated_index(10, false), 3);
        assert_eq!(storage.next_populated_index(NO_ENTRY, true), 3);
        assert_eq!(storage.next_populated_index(NO_ENTRY, false), 20);
    }

    #[test]
    fn test_next_populated_single_entry_returns_itself() {
        let mut storage = empty_directory();
        storage.set_directory_entry(7, Some("1"), None).unwrap();
        assert_eq!(storage.next_populated_index(7, true), 7);
        assert_eq!(storage.next_populated_index(7, false), 7);
    }

    #[test]
    fn test_named_navigation() {
        let mut storage = empty_directory();
        assert_eq!(storage.first_named_index_for_letter(b'a'), NO_ENTRY);

        storage.set_directory_entry(0, Some("1"), Some("Carol")).unwrap();
        storage.set_directory_entry(1, Some("2"), Some("alice")).unwrap();
        storage.set_directory_entry(2, Some("3"), Some("Bob")).unwrap();
        storage.set_directory_entry(3, Some("4"), None).unwrap();

        assert_eq!(storage.next_named_index(1, true), 2);
        assert_eq!(storage.next_named_index(0, true), 1);
        assert_eq!(storage.next_named_index(1, false), 0);
        assert_eq!(storage.next_named_index(3, true), NO_ENTRY);

        assert_eq!(storage.first_named_index_for_letter(b'b'), 2);
        assert_eq!(storage.first_named_index_for_letter(b'B'), 2);
        assert_eq!(storage.first_named_index_for_letter(b'c'), 0);
        assert_eq!(storage.first_named_index_for_letter(b'z'), 1);
    }

    #[test]
    fn test_directory_write_touches_only_its_entry() {
        let mut storage = empty_directory();
        storage.memory_mut().clear_write_log();
        storage
            .set_directory_entry(2, Some("911"), Some("Help"))
            .unwrap();
        storage.flush();

        let entry = layout::DIRECTORY.get(2).unwrap();
        let log = storage.memory().write_log();
        assert!(!log.is_empty());
        assert!(log.iter().all(|&a| entry.range().contains(&(a as usize))));
        assert_eq!(&storage.memory().cells()[entry.range()], storage.record().field(entry));
    }
}
