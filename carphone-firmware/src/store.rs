//! The single storage instance
//!
//! Installed once by `main` after loading, then shared between the storage
//! task (which ticks it) and anything that reads or changes settings.
//! Every access holds a critical section for the duration of the closure,
//! so closures must not block.

use core::cell::RefCell;

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use carphone_core::storage::Storage;
use carphone_drivers::eeprom::Spi25Eeprom;

/// EEPROM on its own SPI bus
pub type Eeprom = Spi25Eeprom<ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, Delay>>;

/// Storage as used by this board
pub type AppStorage = Storage<Eeprom>;

static STORAGE: Mutex<CriticalSectionRawMutex, RefCell<Option<AppStorage>>> =
    Mutex::new(RefCell::new(None));

/// Make `storage` the shared instance
pub fn install(storage: AppStorage) {
    STORAGE.lock(|cell| *cell.borrow_mut() = Some(storage));
}

/// Run `f` on the shared instance; `None` before [`install`]
pub fn with<R>(f: impl FnOnce(&mut AppStorage) -> R) -> Option<R> {
    STORAGE.lock(|cell| cell.borrow_mut().as_mut().map(f))
}
