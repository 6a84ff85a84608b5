//! Factory defaults generated from factory.toml by the build script

use carphone_core::config::{CallerIdMode, FactoryDefaults, SeedEntry, Toggles};

include!(concat!(env!("OUT_DIR"), "/factory_defaults.rs"));
