//! 25xx serial EEPROM (SPI)
//!
//! Small Microchip/ST style SPI EEPROMs (25LC080, M95080 and friends).
//! Every command is one chip-select cycle:
//!
//! - `READ addr_hi addr_lo` followed by any number of data bytes
//! - `WREN` must precede each `WRITE`; the latch clears once the write
//!   cycle finishes
//! - `RDSR` returns the status register, bit 0 (WIP) is set while a write
//!   cycle is running
//! - `WRDI` clears the write-enable latch, protecting the array
//!
//! Bus errors are not propagated through [`RawMemory`]. They are logged,
//! counted in [`Spi25Eeprom::faults`], and the operation degrades to the
//! erased value (reads) or "not started" (writes).

use carphone_hal::{Address, RawMemory};
use embedded_hal::spi::{Operation, SpiDevice};

/// Instruction set
pub mod cmd {
    /// Read data
    pub const READ: u8 = 0x03;
    /// Write data
    pub const WRITE: u8 = 0x02;
    /// Reset the write-enable latch
    pub const WRDI: u8 = 0x04;
    /// Set the write-enable latch
    pub const WREN: u8 = 0x06;
    /// Read status register
    pub const RDSR: u8 = 0x05;
}

/// Write-in-progress bit of the status register
pub const STATUS_WIP: u8 = 0x01;

/// Value returned for reads that could not be performed
const UNREADABLE: u8 = 0xFF;

/// EEPROM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Spi25Config {
    /// Array size in bytes
    pub size: usize,
}

impl Default for Spi25Config {
    fn default() -> Self {
        // 25LC080: 8 Kbit
        Self { size: 1024 }
    }
}

/// 25xx EEPROM behind an SPI device (bus plus chip select)
pub struct Spi25Eeprom<SPI> {
    spi: SPI,
    config: Spi25Config,
    faults: u32,
}

impl<SPI: SpiDevice> Spi25Eeprom<SPI> {
    /// Create a driver; the chip needs no initialisation
    pub fn new(spi: SPI, config: Spi25Config) -> Self {
        Self {
            spi,
            config,
            faults: 0,
        }
    }

    /// Number of failed bus transactions
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Give back the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }

    fn in_range(&self, address: Address, len: usize) -> bool {
        address as usize + len <= self.config.size
    }

    #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
    fn fault(&mut self, operation: &'static str) {
        self.faults = self.faults.saturating_add(1);
        #[cfg(feature = "defmt")]
        defmt::error!("EEPROM SPI fault during {=str}", operation);
    }

    fn command(&mut self, instruction: u8, operation: &'static str) -> bool {
        if self.spi.write(&[instruction]).is_err() {
            self.fault(operation);
            return false;
        }
        true
    }

    fn read_status(&mut self) -> Option<u8> {
        let mut status = [0u8];
        let result = self.spi.transaction(&mut [
            Operation::Write(&[cmd::RDSR]),
            Operation::Read(&mut status),
        ]);
        match result {
            Ok(()) => Some(status[0]),
            Err(_) => {
                self.fault("status read");
                None
            }
        }
    }
}

impl<SPI: SpiDevice> RawMemory for Spi25Eeprom<SPI> {
    fn size(&self) -> usize {
        self.config.size
    }

    fn read_byte(&mut self, address: Address) -> u8 {
        let mut byte = [UNREADABLE];
        self.read_bytes(address, &mut byte);
        byte[0]
    }

    fn read_bytes(&mut self, address: Address, buffer: &mut [u8]) {
        if !self.in_range(address, buffer.len()) {
            buffer.fill(UNREADABLE);
            return;
        }
        let [hi, lo] = address.to_be_bytes();
        let result = self.spi.transaction(&mut [
            Operation::Write(&[cmd::READ, hi, lo]),
            Operation::Read(&mut *buffer),
        ]);
        if result.is_err() {
            self.fault("read");
            buffer.fill(UNREADABLE);
        }
    }

    fn try_start_write(&mut self, address: Address, value: u8) -> bool {
        if !self.in_range(address, 1) {
            return false;
        }
        if self.read_byte(address) == value {
            return false;
        }
        if !self.command(cmd::WREN, "write enable") {
            return false;
        }
        let [hi, lo] = address.to_be_bytes();
        if self.spi.write(&[cmd::WRITE, hi, lo, value]).is_err() {
            self.fault("write");
            return false;
        }
        true
    }

    fn is_write_in_progress(&mut self) -> bool {
        // A failed status read reports idle so callers never spin on a dead bus
        self.read_status()
            .map_or(false, |status| status & STATUS_WIP != 0)
    }

    fn protect(&mut self) {
        self.command(cmd::WRDI, "write disable");
    }
}
