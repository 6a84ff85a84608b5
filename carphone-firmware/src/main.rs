//! Carphone - Car Phone / Bluetooth Handset Controller Firmware
//!
//! Main firmware binary for RP2040-based handset controllers. Loads the
//! persisted configuration from the serial EEPROM at boot (reformatting it
//! with factory defaults when the layout does not match) and keeps it in
//! sync from then on without ever blocking on the memory.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Duration, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use {defmt_rtt as _, panic_probe as _};

use carphone_core::config::VolumeMode;
use carphone_core::storage::{BootOutcome, Storage};
use carphone_drivers::eeprom::{Spi25Config, Spi25Eeprom};

mod board;
mod factory;
mod store;
mod tasks;

/// Interval between storage health reports
const REPORT_INTERVAL_SECS: u64 = 60;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Carphone firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // EEPROM on SPI0 (pin map in board.rs)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = board::EEPROM_SPI_FREQUENCY_HZ;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let device = ExclusiveDevice::new(spi, cs, Delay).expect("EEPROM CS init failed");
    let eeprom = Spi25Eeprom::new(
        device,
        Spi25Config {
            size: board::EEPROM_SIZE,
        },
    );

    let mut storage = Storage::new(eeprom, factory::FACTORY_DEFAULTS);
    match storage.load() {
        BootOutcome::Loaded => info!("Settings loaded from EEPROM"),
        BootOutcome::FactoryReset => warn!("EEPROM reformatted with factory defaults"),
        BootOutcome::MemoryTooSmall => error!("EEPROM too small, settings will not persist"),
    }
    info!(
        "Ringer volume {}, ringtone {}, {} directory entries",
        storage.record().volume_level(VolumeMode::Ringer),
        storage.record().ringtone(),
        storage.directory_entry_count()
    );
    store::install(storage);

    spawner.spawn(tasks::storage_task()).unwrap();
    info!("All tasks spawned");

    loop {
        Timer::after(Duration::from_secs(REPORT_INTERVAL_SECS)).await;
        if let Some((stats, faults)) =
            store::with(|storage| (storage.stats(), storage.memory().faults()))
        {
            info!(
                "Storage: {} runs queued, {} dropped, {} bytes written, {} skipped, {} bus faults",
                stats.runs_enqueued,
                stats.dropped_runs,
                stats.bytes_written,
                stats.bytes_skipped,
                faults
            );
        }
    }
}
