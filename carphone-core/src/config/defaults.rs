//! Factory default settings
//!
//! Applied whenever the stored marker/version does not match, and on a
//! user-initiated master reset.

use super::types::{CallerIdMode, Toggle, Toggles};
use super::{SEED_ENTRY_COUNT, VOLUME_MODE_COUNT};

/// Directory entry written by a factory reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SeedEntry {
    /// Directory slot
    pub index: u8,
    /// Entry name
    pub name: &'static str,
    /// Dialable number
    pub number: &'static str,
}

/// Complete set of factory defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FactoryDefaults {
    /// LCD view angle
    pub lcd_view_angle: u8,
    /// Volume level per [`VolumeMode`](super::VolumeMode)
    pub volume_levels: [u8; VOLUME_MODE_COUNT],
    /// Ringtone index
    pub ringtone: u8,
    /// Enabled toggles
    pub toggles: Toggles,
    /// Caller ID mode
    pub caller_id_mode: CallerIdMode,
    /// Security code (all digits)
    pub security_code: &'static str,
    /// Bluetooth name shown to paired devices
    pub paired_device_name: &'static str,
    /// Initials stored with the zero high score
    pub tetris_initials: [u8; 3],
    /// Example directory entries
    pub directory_seed: [SeedEntry; SEED_ENTRY_COUNT],
}

impl FactoryDefaults {
    /// Built-in defaults
    pub const DEFAULT: FactoryDefaults = FactoryDefaults {
        lcd_view_angle: 8,
        volume_levels: [4, 4, 5, 3],
        ringtone: 0,
        toggles: Toggles::empty()
            .with(Toggle::StatusBeep)
            .with(Toggle::CumulativeTimerReset),
        caller_id_mode: CallerIdMode::NumberOnly,
        security_code: "000000",
        paired_device_name: "Car Phone",
        tetris_initials: *b"AAA",
        directory_seed: [
            SeedEntry {
                index: 0,
                name: "Emergency",
                number: "911",
            },
            SeedEntry {
                index: 1,
                name: "Info",
                number: "411",
            },
            SeedEntry {
                index: 2,
                name: "Voicemail",
                number: "*86",
            },
            SeedEntry {
                index: 3,
                name: "Roadside",
                number: "18002224357",
            },
            SeedEntry {
                index: 4,
                name: "Home",
                number: "5555550100",
            },
            SeedEntry {
                index: 5,
                name: "Office",
                number: "5555550199P42",
            },
        ],
    };
}

impl Default for FactoryDefaults {
    fn default() -> Self {
        Self::DEFAULT
    }
}
