//! Storage tick task
//!
//! Drives the write engine: one step per tick, never waiting on the EEPROM.
//! A 25xx write cycle takes up to 5 ms, so most ticks while draining see a
//! busy chip and return immediately.

use defmt::*;
use embassy_time::{Duration, Ticker};

use carphone_core::storage::TickOutcome;

use crate::store;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

/// Storage task - advances the write engine every tick
#[embassy_executor::task]
pub async fn storage_task() {
    info!("Storage task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut dropped_runs = 0;

    loop {
        ticker.next().await;

        let Some((outcome, stats)) = store::with(|storage| (storage.tick(), storage.stats())) else {
            continue;
        };

        if let TickOutcome::Wrote(address) = outcome {
            trace!("EEPROM write at {=u16}", address);
        }
        if stats.dropped_runs != dropped_runs {
            warn!(
                "{} setting updates not persisted so far",
                stats.dropped_runs
            );
            dropped_runs = stats.dropped_runs;
        }
    }
}
