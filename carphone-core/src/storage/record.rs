//! In-memory mirror of the persisted blob
//!
//! [`StorageRecord`] holds the exact bytes of the blob and decodes fields
//! on access. Mutators validate their arguments, update the bytes and
//! return the [`Field`] that changed so the caller can queue it for
//! persistence. Getters never fail: out-of-range stored values fall back
//! to a documented value instead.

use heapless::String;

use super::layout::{self, Field, RECORD_SIZE};
use super::StorageError;
use crate::codec::{self, number, text};
use crate::config::{
    CallTimer, CallerIdMode, FactoryDefaults, Toggle, Toggles, VolumeMode, DIRECTORY_SIZE,
    MAX_LCD_VIEW_ANGLE, MAX_VOLUME_LEVEL, NO_ENTRY, OWN_NUMBER_COUNT, PAIRED_DEVICE_NAME_LEN,
    RINGTONE_COUNT, SECURITY_CODE_LEN, STORAGE_MARKER, STORAGE_VERSION, TETRIS_INITIALS_LEN,
};

/// Byte image of the persisted configuration
#[derive(Clone, PartialEq, Eq)]
pub struct StorageRecord {
    bytes: [u8; RECORD_SIZE],
}

impl core::fmt::Debug for StorageRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StorageRecord")
            .field("marker", &self.marker())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl Default for StorageRecord {
    fn default() -> Self {
        Self::erased()
    }
}

impl StorageRecord {
    /// Record as read from blank memory (every byte `0xFF`)
    pub const fn erased() -> Self {
        Self {
            bytes: [number::EMPTY; RECORD_SIZE],
        }
    }

    /// Record from raw blob bytes
    pub const fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self { bytes }
    }

    /// Record holding `defaults`, stamped with the current marker/version
    ///
    /// The directory is empty apart from the seed entries. Defaults that
    /// fail validation leave their field erased.
    pub fn factory(defaults: &FactoryDefaults) -> Self {
        let mut record = Self::erased();

        for mode in VolumeMode::ALL {
            let level = defaults.volume_levels[mode.index()];
            check_default(record.set_volume_level(mode, level));
        }
        check_default(record.set_lcd_view_angle(defaults.lcd_view_angle));
        check_default(record.set_selected_directory_index(NO_ENTRY));
        check_default(record.set_ringtone(defaults.ringtone));
        for field in [
            layout::LAST_CALL_TIME,
            layout::CUMULATIVE_CALL_TIME,
            layout::TOTAL_CALL_TIME,
        ] {
            record.write_call_timer(field, CallTimer::ZERO);
        }
        record.set_byte(layout::TOGGLES, defaults.toggles.bits());
        check_default(record.set_active_own_number_index(0));
        record.set_byte(layout::PROGRAMMING_COUNT, 0);
        let initials = core::str::from_utf8(&defaults.tetris_initials).unwrap_or("AAA");
        check_default(record.set_tetris_high_score(0, initials));
        check_default(record.set_paired_device_name(defaults.paired_device_name));
        check_default(record.set_security_code(defaults.security_code));
        check_default(record.set_caller_id_mode(defaults.caller_id_mode));

        for seed in &defaults.directory_seed {
            check_default(record.set_directory_entry(
                seed.index as usize,
                Some(seed.number),
                Some(seed.name),
            ));
        }

        record.stamp();
        record
    }

    /// Raw blob bytes
    pub fn as_bytes(&self) -> &[u8; RECORD_SIZE] {
        &self.bytes
    }

    /// Bytes of one field
    pub fn field(&self, field: Field) -> &[u8] {
        &self.bytes[field.range()]
    }

    pub(crate) fn field_mut(&mut self, field: Field) -> &mut [u8] {
        &mut self.bytes[field.range()]
    }

    fn byte(&self, field: Field) -> u8 {
        self.bytes[field.offset as usize]
    }

    fn set_byte(&mut self, field: Field, value: u8) -> Field {
        self.bytes[field.offset as usize] = value;
        field
    }

    // ---------------------------------------------------------------------
    // Compatibility stamp
    // ---------------------------------------------------------------------

    /// Stored marker byte
    pub fn marker(&self) -> u8 {
        self.byte(layout::MARKER)
    }

    /// Stored layout version
    pub fn version(&self) -> u8 {
        self.byte(layout::VERSION)
    }

    /// Check whether the blob was written by this layout
    pub fn is_compatible(&self) -> bool {
        self.marker() == STORAGE_MARKER && self.version() == STORAGE_VERSION
    }

    pub(crate) fn stamp(&mut self) {
        self.set_byte(layout::MARKER, STORAGE_MARKER);
        self.set_byte(layout::VERSION, STORAGE_VERSION);
    }

    // ---------------------------------------------------------------------
    // Audio and display
    // ---------------------------------------------------------------------

    /// Volume level for `mode`, clamped to [`MAX_VOLUME_LEVEL`]
    pub fn volume_level(&self, mode: VolumeMode) -> u8 {
        let field = layout::VOLUME_LEVELS.get(mode.index());
        field.map_or(0, |f| self.byte(f).min(MAX_VOLUME_LEVEL))
    }

    pub(crate) fn set_volume_level(&mut self, mode: VolumeMode, level: u8) -> Result<Field, StorageError> {
        if level > MAX_VOLUME_LEVEL {
            return Err(StorageError::InvalidArgument);
        }
        let field = layout::VOLUME_LEVELS
            .get(mode.index())
            .ok_or(StorageError::InvalidArgument)?;
        Ok(self.set_byte(field, level))
    }

    /// LCD view angle, clamped to [`MAX_LCD_VIEW_ANGLE`]
    pub fn lcd_view_angle(&self) -> u8 {
        self.byte(layout::LCD_VIEW_ANGLE).min(MAX_LCD_VIEW_ANGLE)
    }

    pub(crate) fn set_lcd_view_angle(&mut self, angle: u8) -> Result<Field, StorageError> {
        if angle > MAX_LCD_VIEW_ANGLE {
            return Err(StorageError::InvalidArgument);
        }
        Ok(self.set_byte(layout::LCD_VIEW_ANGLE, angle))
    }

    /// Selected ringtone, `0` if the stored value is out of range
    pub fn ringtone(&self) -> u8 {
        let ringtone = self.byte(layout::RINGTONE);
        if ringtone < RINGTONE_COUNT {
            ringtone
        } else {
            0
        }
    }

    pub(crate) fn set_ringtone(&mut self, ringtone: u8) -> Result<Field, StorageError> {
        if ringtone >= RINGTONE_COUNT {
            return Err(StorageError::InvalidArgument);
        }
        Ok(self.set_byte(layout::RINGTONE, ringtone))
    }

    /// Caller ID mode, [`CallerIdMode::Off`] if the stored value is unknown
    pub fn caller_id_mode(&self) -> CallerIdMode {
        CallerIdMode::from_u8(self.byte(layout::CALLER_ID_MODE)).unwrap_or_default()
    }

    pub(crate) fn set_caller_id_mode(&mut self, mode: CallerIdMode) -> Result<Field, StorageError> {
        Ok(self.set_byte(layout::CALLER_ID_MODE, mode.as_u8()))
    }

    // ---------------------------------------------------------------------
    // Toggles and counters
    // ---------------------------------------------------------------------

    /// All toggles
    pub fn toggles(&self) -> Toggles {
        Toggles::from_bits(self.byte(layout::TOGGLES))
    }

    /// Check whether `toggle` is on
    pub fn toggle(&self, toggle: Toggle) -> bool {
        self.toggles().contains(toggle)
    }

    pub(crate) fn set_toggle(&mut self, toggle: Toggle, on: bool) -> Field {
        let mut toggles = self.toggles();
        toggles.set(toggle, on);
        self.set_byte(layout::TOGGLES, toggles.bits())
    }

    /// Index of the active own number, `0` if the stored value is invalid
    pub fn active_own_number_index(&self) -> u8 {
        let index = self.byte(layout::ACTIVE_OWN_NUMBER);
        if (index as usize) < OWN_NUMBER_COUNT {
            index
        } else {
            0
        }
    }

    pub(crate) fn set_active_own_number_index(&mut self, index: u8) -> Result<Field, StorageError> {
        if index as usize >= OWN_NUMBER_COUNT {
            return Err(StorageError::InvalidArgument);
        }
        Ok(self.set_byte(layout::ACTIVE_OWN_NUMBER, index))
    }

    /// Times programming mode has been entered (saturates at 255)
    pub fn programming_count(&self) -> u8 {
        self.byte(layout::PROGRAMMING_COUNT)
    }

    pub(crate) fn increment_programming_count(&mut self) -> Field {
        let count = self.programming_count().saturating_add(1);
        self.set_byte(layout::PROGRAMMING_COUNT, count)
    }

    /// Last selected directory entry, or [`NO_ENTRY`]
    pub fn selected_directory_index(&self) -> u8 {
        let index = self.byte(layout::DIRECTORY_CURSOR);
        if (index as usize) < DIRECTORY_SIZE {
            index
        } else {
            NO_ENTRY
        }
    }

    pub(crate) fn set_selected_directory_index(&mut self, index: u8) -> Result<Field, StorageError> {
        if index != NO_ENTRY && index as usize >= DIRECTORY_SIZE {
            return Err(StorageError::InvalidArgument);
        }
        Ok(self.set_byte(layout::DIRECTORY_CURSOR, index))
    }

    // ---------------------------------------------------------------------
    // Call timers
    // ---------------------------------------------------------------------

    fn call_timer(&self, field: Field) -> CallTimer {
        let bytes = self.field(field);
        CallTimer {
            minutes: u16::from_le_bytes([bytes[0], bytes[1]]),
            seconds: bytes[2].min(59),
        }
    }

    fn write_call_timer(&mut self, field: Field, timer: CallTimer) -> Field {
        let [lo, hi] = timer.minutes.to_le_bytes();
        self.field_mut(field).copy_from_slice(&[lo, hi, timer.seconds]);
        field
    }

    /// Duration of the most recent call
    pub fn last_call_time(&self) -> CallTimer {
        self.call_timer(layout::LAST_CALL_TIME)
    }

    /// Call time since the cumulative timer was last reset
    pub fn cumulative_call_time(&self) -> CallTimer {
        self.call_timer(layout::CUMULATIVE_CALL_TIME)
    }

    /// Lifetime call time
    pub fn total_call_time(&self) -> CallTimer {
        self.call_timer(layout::TOTAL_CALL_TIME)
    }

    /// Account a finished call; returns the span of all three timers
    pub(crate) fn record_call(&mut self, duration_seconds: u32) -> Field {
        let cumulative = self.cumulative_call_time().saturating_add_seconds(duration_seconds);
        let total = self.total_call_time().saturating_add_seconds(duration_seconds);
        self.write_call_timer(layout::LAST_CALL_TIME, CallTimer::from_seconds(duration_seconds));
        self.write_call_timer(layout::CUMULATIVE_CALL_TIME, cumulative);
        self.write_call_timer(layout::TOTAL_CALL_TIME, total);
        Field::at(
            layout::LAST_CALL_TIME.offset,
            layout::TOTAL_CALL_TIME.end() - layout::LAST_CALL_TIME.offset,
        )
    }

    pub(crate) fn reset_cumulative_call_time(&mut self) -> Field {
        self.write_call_timer(layout::CUMULATIVE_CALL_TIME, CallTimer::ZERO)
    }

    // ---------------------------------------------------------------------
    // Games, Bluetooth, security
    // ---------------------------------------------------------------------

    /// Tetris high score
    pub fn tetris_high_score(&self) -> u32 {
        let bytes = self.field(layout::TETRIS_HIGH_SCORE);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Initials stored with the Tetris high score
    pub fn tetris_high_score_initials(&self) -> String<TETRIS_INITIALS_LEN> {
        text::decode_text(self.field(layout::TETRIS_INITIALS))
    }

    /// Store a new high score; returns the span of score and initials
    pub(crate) fn set_tetris_high_score(&mut self, score: u32, initials: &str) -> Result<Field, StorageError> {
        let initials = initials.as_bytes();
        if initials.len() != TETRIS_INITIALS_LEN || !initials.iter().all(u8::is_ascii_uppercase) {
            return Err(StorageError::InvalidArgument);
        }
        self.field_mut(layout::TETRIS_HIGH_SCORE)
            .copy_from_slice(&score.to_le_bytes());
        self.field_mut(layout::TETRIS_INITIALS).copy_from_slice(initials);
        Ok(Field::at(
            layout::TETRIS_HIGH_SCORE.offset,
            layout::TETRIS_INITIALS.end() - layout::TETRIS_HIGH_SCORE.offset,
        ))
    }

    /// Bluetooth name shown to paired devices
    pub fn paired_device_name(&self) -> String<PAIRED_DEVICE_NAME_LEN> {
        text::decode_text(self.field(layout::PAIRED_DEVICE_NAME))
    }

    /// Longer names are truncated to [`PAIRED_DEVICE_NAME_LEN`]
    pub(crate) fn set_paired_device_name(&mut self, name: &str) -> Result<Field, StorageError> {
        let mut encoded = [0u8; PAIRED_DEVICE_NAME_LEN];
        text::encode_text(name, &mut encoded).map_err(|_| StorageError::InvalidArgument)?;
        self.field_mut(layout::PAIRED_DEVICE_NAME)
            .copy_from_slice(&encoded);
        Ok(layout::PAIRED_DEVICE_NAME)
    }

    /// Stored security code
    pub fn security_code(&self) -> String<SECURITY_CODE_LEN> {
        codec::uncompress(self.field(layout::SECURITY_CODE), SECURITY_CODE_LEN)
    }

    /// Compare an entered code with the stored one
    ///
    /// Every digit is compared regardless of earlier mismatches.
    pub fn verify_security_code(&self, code: &str) -> bool {
        let stored = self.security_code();
        if stored.len() != SECURITY_CODE_LEN || code.len() != SECURITY_CODE_LEN {
            return false;
        }
        stored
            .bytes()
            .zip(code.bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
    }

    /// The code must be exactly [`SECURITY_CODE_LEN`] decimal digits
    pub(crate) fn set_security_code(&mut self, code: &str) -> Result<Field, StorageError> {
        if code.len() != SECURITY_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StorageError::InvalidArgument);
        }
        self.set_number(layout::SECURITY_CODE, SECURITY_CODE_LEN, Some(code))
    }
}

/// Report a factory default that failed validation
fn check_default<T>(result: Result<T, StorageError>) {
    if result.is_err() {
        #[cfg(feature = "defmt")]
        defmt::warn!("Invalid factory default ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> StorageRecord {
        StorageRecord::factory(&FactoryDefaults::DEFAULT)
    }

    #[test]
    fn test_erased_record_is_incompatible() {
        assert!(!StorageRecord::erased().is_compatible());
        assert!(factory().is_compatible());
    }

    #[test]
    fn test_factory_values() {
        let record = factory();
        let defaults = FactoryDefaults::DEFAULT;
        assert_eq!(record.volume_level(VolumeMode::Ringer), defaults.volume_levels[2]);
        assert_eq!(record.lcd_view_angle(), defaults.lcd_view_angle);
        assert_eq!(record.toggles(), defaults.toggles);
        assert_eq!(record.caller_id_mode(), defaults.caller_id_mode);
        assert_eq!(record.security_code().as_str(), "000000");
        assert_eq!(record.paired_device_name().as_str(), "Car Phone");
        assert_eq!(record.tetris_high_score(), 0);
        assert_eq!(record.tetris_high_score_initials().as_str(), "AAA");
        assert_eq!(record.total_call_time(), CallTimer::ZERO);
        assert_eq!(record.selected_directory_index(), NO_ENTRY);
        assert_eq!(record.programming_count(), 0);
    }

    #[test]
    fn test_getters_fall_back_on_corrupt_bytes() {
        let record = StorageRecord::erased();
        assert_eq!(record.volume_level(VolumeMode::Handset), MAX_VOLUME_LEVEL);
        assert_eq!(record.lcd_view_angle(), MAX_LCD_VIEW_ANGLE);
        assert_eq!(record.ringtone(), 0);
        assert_eq!(record.caller_id_mode(), CallerIdMode::Off);
        assert_eq!(record.active_own_number_index(), 0);
        assert_eq!(record.selected_directory_index(), NO_ENTRY);
        assert_eq!(record.security_code().as_str(), "");
        assert_eq!(record.last_call_time().seconds, 59);
    }

    #[test]
    fn test_invalid_arguments_change_nothing() {
        let mut record = factory();
        let before = record.clone();
        assert_eq!(
            record.set_volume_level(VolumeMode::Handset, MAX_VOLUME_LEVEL + 1),
            Err(StorageError::InvalidArgument)
        );
        assert!(record.set_lcd_view_angle(MAX_LCD_VIEW_ANGLE + 1).is_err());
        assert!(record.set_ringtone(RINGTONE_COUNT).is_err());
        assert!(record.set_active_own_number_index(2).is_err());
        assert!(record.set_selected_directory_index(DIRECTORY_SIZE as u8).is_err());
        assert!(record.set_security_code("12345").is_err());
        assert!(record.set_security_code("12345a").is_err());
        assert!(record.set_tetris_high_score(10, "ab1").is_err());
        assert!(record.set_paired_device_name("Zoë's phone").is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_record_call_accumulates() {
        let mut record = factory();
        let span = record.record_call(125);
        assert_eq!(span, Field::at(9, 9));
        record.record_call(50);

        assert_eq!(record.last_call_time(), CallTimer { minutes: 0, seconds: 50 });
        assert_eq!(record.cumulative_call_time(), CallTimer { minutes: 2, seconds: 55 });
        assert_eq!(record.total_call_time(), CallTimer { minutes: 2, seconds: 55 });

        record.reset_cumulative_call_time();
        assert_eq!(record.cumulative_call_time(), CallTimer::ZERO);
        assert_eq!(record.total_call_time().as_seconds(), 175);
    }

    #[test]
    fn test_security_code_verification() {
        let mut record = factory();
        record.set_security_code("482916").unwrap();
        assert!(record.verify_security_code("482916"));
        assert!(!record.verify_security_code("482917"));
        assert!(!record.verify_security_code("48291"));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut record = factory();
        let field = record.set_toggle(Toggle::AutoAnswer, true);
        assert_eq!(field, layout::TOGGLES);
        assert!(record.toggle(Toggle::AutoAnswer));
        record.set_toggle(Toggle::StatusBeep, false);
        assert!(!record.toggle(Toggle::StatusBeep));
    }

    #[test]
    fn test_programming_count_saturates() {
        let mut record = factory();
        for _ in 0..300 {
            record.increment_programming_count();
        }
        assert_eq!(record.programming_count(), 255);
    }

    #[test]
    fn test_tetris_high_score_span() {
        let mut record = factory();
        let field = record.set_tetris_high_score(123_456, "JPL").unwrap();
        assert_eq!(field, Field::at(21, 7));
        assert_eq!(record.tetris_high_score(), 123_456);
        assert_eq!(record.tetris_high_score_initials().as_str(), "JPL");
    }
}
