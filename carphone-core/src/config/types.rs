//! Typed values of the persisted settings

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::VOLUME_MODE_COUNT;

/// Audio path a volume level applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum VolumeMode {
    /// Handset earpiece
    #[default]
    Handset = 0,
    /// Hands-free speaker
    Handsfree = 1,
    /// Ringer
    Ringer = 2,
    /// Keypad tones
    Keypad = 3,
}

impl VolumeMode {
    /// All modes in storage order
    pub const ALL: [VolumeMode; VOLUME_MODE_COUNT] = [
        VolumeMode::Handset,
        VolumeMode::Handsfree,
        VolumeMode::Ringer,
        VolumeMode::Keypad,
    ];

    /// Index of this mode in the volume table
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Mode from its table index
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

/// Caller ID presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum CallerIdMode {
    /// Caller ID not shown
    #[default]
    Off = 0,
    /// Show the calling number
    NumberOnly = 1,
    /// Show the directory name when known, else the number
    NameAndNumber = 2,
}

impl CallerIdMode {
    /// Get the mode as a byte value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a mode from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CallerIdMode::Off),
            1 => Some(CallerIdMode::NumberOnly),
            2 => Some(CallerIdMode::NameAndNumber),
            _ => None,
        }
    }
}

/// Feature toggles, stored as one bit each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Toggle {
    /// Beep on service status changes
    StatusBeep = 0,
    /// Beep once a minute during a call
    OneMinuteBeep = 1,
    /// Vehicle (hands-free cradle) mode
    VehicleMode = 2,
    /// Show own number on the idle screen
    ShowOwnNumber = 3,
    /// Two own numbers are configured
    DualNumbers = 4,
    /// Allow the cumulative call timer to be reset
    CumulativeTimerReset = 5,
    /// Answer incoming calls automatically
    AutoAnswer = 6,
}

impl Toggle {
    /// Bit mask of this toggle inside [`Toggles`]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of enabled [`Toggle`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Toggles(u8);

impl Toggles {
    /// Mask of all defined toggle bits
    pub const VALID_BITS: u8 = 0x7F;

    /// No toggle enabled
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Toggles from their stored byte (undefined bits are dropped)
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID_BITS)
    }

    /// Stored byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Return a copy with `toggle` switched on
    pub const fn with(self, toggle: Toggle) -> Self {
        Self(self.0 | toggle.mask())
    }

    /// Check whether `toggle` is on
    pub const fn contains(self, toggle: Toggle) -> bool {
        self.0 & toggle.mask() != 0
    }

    /// Switch `toggle` on or off
    pub fn set(&mut self, toggle: Toggle, on: bool) {
        if on {
            self.0 |= toggle.mask();
        } else {
            self.0 &= !toggle.mask();
        }
    }
}

/// Call duration in minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CallTimer {
    /// Whole minutes
    pub minutes: u16,
    /// Seconds (0-59)
    pub seconds: u8,
}

impl CallTimer {
    /// Largest representable duration (65535:59)
    pub const MAX: CallTimer = CallTimer {
        minutes: u16::MAX,
        seconds: 59,
    };

    /// Zero duration
    pub const ZERO: CallTimer = CallTimer {
        minutes: 0,
        seconds: 0,
    };

    /// Build a timer from a number of seconds, saturating at [`CallTimer::MAX`]
    pub fn from_seconds(total: u32) -> Self {
        let minutes = total / 60;
        if minutes > u16::MAX as u32 {
            return Self::MAX;
        }
        Self {
            minutes: minutes as u16,
            seconds: (total % 60) as u8,
        }
    }

    /// Duration in seconds
    pub fn as_seconds(self) -> u32 {
        self.minutes as u32 * 60 + self.seconds.min(59) as u32
    }

    /// Add `seconds`, saturating at [`CallTimer::MAX`]
    pub fn saturating_add_seconds(self, seconds: u32) -> Self {
        Self::from_seconds(self.as_seconds().saturating_add(seconds))
    }
}
