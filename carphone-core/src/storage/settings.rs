//! Setters for scalar settings
//!
//! Every setter validates first; on `Err(InvalidArgument)` nothing changed.
//! Any other error means the mirror was updated but the write was dropped.
//! Read values back through [`Storage::record`].

use carphone_hal::RawMemory;

use super::context::Storage;
use super::StorageError;
use crate::config::{CallerIdMode, Toggle, VolumeMode};

impl<M: RawMemory, const N: usize> Storage<M, N> {
    /// Set the volume level for one audio path (`0..=7`)
    pub fn set_volume_level(&mut self, mode: VolumeMode, level: u8) -> Result<(), StorageError> {
        let field = self.record.set_volume_level(mode, level)?;
        self.persist(field)
    }

    /// Set the LCD view angle (`0..=15`)
    pub fn set_lcd_view_angle(&mut self, angle: u8) -> Result<(), StorageError> {
        let field = self.record.set_lcd_view_angle(angle)?;
        self.persist(field)
    }

    /// Select the ringtone (`0..=7`)
    pub fn set_ringtone(&mut self, ringtone: u8) -> Result<(), StorageError> {
        let field = self.record.set_ringtone(ringtone)?;
        self.persist(field)
    }

    /// Set how incoming callers are shown
    pub fn set_caller_id_mode(&mut self, mode: CallerIdMode) -> Result<(), StorageError> {
        let field = self.record.set_caller_id_mode(mode)?;
        self.persist(field)
    }

    /// Switch one feature toggle on or off
    pub fn set_toggle(&mut self, toggle: Toggle, on: bool) -> Result<(), StorageError> {
        let field = self.record.set_toggle(toggle, on);
        self.persist(field)
    }

    /// Choose which own number is active (`0` or `1`)
    pub fn set_active_own_number_index(&mut self, index: u8) -> Result<(), StorageError> {
        let field = self.record.set_active_own_number_index(index)?;
        self.persist(field)
    }

    /// Count one more programming session (saturating)
    pub fn increment_programming_count(&mut self) -> Result<(), StorageError> {
        let field = self.record.increment_programming_count();
        self.persist(field)
    }

    /// Last selected directory entry, or [`NO_ENTRY`](crate::config::NO_ENTRY)
    pub fn selected_directory_index(&self) -> u8 {
        self.record.selected_directory_index()
    }

    /// Remember the selected directory entry (`0..29`, or `NO_ENTRY`)
    pub fn set_selected_directory_index(&mut self, index: u8) -> Result<(), StorageError> {
        let field = self.record.set_selected_directory_index(index)?;
        self.persist(field)
    }

    /// Account a finished call in all three call timers
    pub fn record_call(&mut self, duration_seconds: u32) -> Result<(), StorageError> {
        let field = self.record.record_call(duration_seconds);
        self.persist(field)
    }

    /// Zero the cumulative call timer
    pub fn reset_cumulative_call_time(&mut self) -> Result<(), StorageError> {
        let field = self.record.reset_cumulative_call_time();
        self.persist(field)
    }

    /// Store a Tetris high score with its three `A-Z` initials
    pub fn set_tetris_high_score(&mut self, score: u32, initials: &str) -> Result<(), StorageError> {
        let field = self.record.set_tetris_high_score(score, initials)?;
        self.persist(field)
    }

    /// Set the Bluetooth name (printable ASCII, truncated to 32 bytes)
    pub fn set_paired_device_name(&mut self, name: &str) -> Result<(), StorageError> {
        let field = self.record.set_paired_device_name(name)?;
        self.persist(field)
    }

    /// Set the security code (exactly six digits)
    pub fn set_security_code(&mut self, code: &str) -> Result<(), StorageError> {
        let field = self.record.set_security_code(code)?;
        self.persist(field)
    }

    /// Check an entered code against the stored security code
    pub fn verify_security_code(&self, code: &str) -> bool {
        self.record.verify_security_code(code)
    }
}
