//! Build script for carphone-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates factory.toml and turns it into a `FactoryDefaults` constant

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use carphone_core::config::CallerIdMode;

/// Directory slots available
const DIRECTORY_SIZE: i64 = 29;
/// Seed entries the firmware expects
const SEED_ENTRY_COUNT: usize = 6;
const DIRECTORY_NAME_LEN: usize = 10;
const DIRECTORY_NUMBER_SYMBOLS: usize = 24;
const PAIRED_DEVICE_NAME_LEN: usize = 32;

/// Toggle keys in bit order
const TOGGLES: [&str; 7] = [
    "status_beep",
    "one_minute_beep",
    "vehicle_mode",
    "show_own_number",
    "dual_numbers",
    "cumulative_timer_reset",
    "auto_answer",
];

fn main() {
    setup_linker();
    generate_factory_defaults();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate factory.toml and write `factory_defaults.rs` to OUT_DIR
fn generate_factory_defaults() {
    println!("cargo:rerun-if-changed=factory.toml");

    let config_path = Path::new("factory.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read factory.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in factory.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let source = render(&config, &mut errors);
    if !errors.is_empty() {
        fail("factory.toml validation failed", &errors);
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("factory_defaults.rs"), source).unwrap();
    println!("cargo:warning=factory.toml validated successfully");
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let mut message = String::from("\n");
    let _ = writeln!(message, "╔{}╗", "═".repeat(68));
    let _ = writeln!(message, "║  ERROR: {:<58} ║", title);
    let _ = writeln!(message, "╠{}╣", "═".repeat(68));
    for line in lines {
        let truncated = if line.len() > 64 {
            format!("{}...", &line[..61])
        } else {
            line.clone()
        };
        let _ = writeln!(message, "║  {:<64}  ║", truncated);
    }
    let _ = writeln!(message, "╚{}╝", "═".repeat(68));
    panic!("{}", message);
}

fn int(config: &toml::Value, section: &str, key: &str, max: i64, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)).and_then(toml::Value::as_integer) {
        Some(value) if (0..=max).contains(&value) => value,
        Some(value) => {
            errors.push(format!("[{section}] {key} = {value} is outside 0-{max}"));
            0
        }
        None => {
            errors.push(format!("[{section}] {key} missing or not an integer"));
            0
        }
    }
}

fn string<'a>(config: &'a toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> &'a str {
    match config.get(section).and_then(|s| s.get(key)).and_then(toml::Value::as_str) {
        Some(value) => value,
        None => {
            errors.push(format!("[{section}] {key} missing or not a string"));
            ""
        }
    }
}

fn is_printable(text: &str) -> bool {
    text.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn is_dialable(text: &str) -> bool {
    text.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'*' | b'#' | b'P' | b'M'))
}

/// Validate every value and build the generated source
fn render(config: &toml::Value, errors: &mut Vec<String>) -> String {
    let lcd_view_angle = int(config, "display", "lcd_view_angle", 15, errors);
    let volumes = ["handset_volume", "handsfree_volume", "ringer_volume", "keypad_volume"]
        .map(|key| int(config, "audio", key, 7, errors));
    let ringtone = int(config, "audio", "ringtone", 7, errors);

    let mut toggle_bits = 0u8;
    for (bit, key) in TOGGLES.iter().enumerate() {
        match config.get("features").and_then(|s| s.get(*key)).and_then(toml::Value::as_bool) {
            Some(true) => toggle_bits |= 1 << bit,
            Some(false) => {}
            None => errors.push(format!("[features] {key} missing or not a boolean")),
        }
    }

    let caller_id = match config.get("features").and_then(|s| s.get("caller_id")) {
        Some(value) => value.clone().try_into::<CallerIdMode>().unwrap_or_else(|_| {
            errors.push(format!(
                "[features] caller_id = {value} is not off, number_only or name_and_number"
            ));
            CallerIdMode::Off
        }),
        None => {
            errors.push("[features] caller_id missing".to_string());
            CallerIdMode::Off
        }
    };

    let code = string(config, "security", "code", errors);
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(format!("[security] code {code:?} must be exactly six digits"));
    }

    let bt_name = string(config, "bluetooth", "name", errors);
    if !is_printable(bt_name) || bt_name.len() > PAIRED_DEVICE_NAME_LEN {
        errors.push(format!(
            "[bluetooth] name must be printable ASCII, at most {PAIRED_DEVICE_NAME_LEN} chars"
        ));
    }

    let initials = string(config, "tetris", "initials", errors);
    if initials.len() != 3 || !initials.bytes().all(|b| b.is_ascii_uppercase()) {
        errors.push(format!("[tetris] initials {initials:?} must be three letters A-Z"));
    }

    let seeds = render_seeds(config, errors);

    let mut source = String::new();
    let _ = writeln!(source, "pub const FACTORY_DEFAULTS: FactoryDefaults = FactoryDefaults {{");
    let _ = writeln!(source, "    lcd_view_angle: {lcd_view_angle},");
    let _ = writeln!(
        source,
        "    volume_levels: [{}, {}, {}, {}],",
        volumes[0], volumes[1], volumes[2], volumes[3]
    );
    let _ = writeln!(source, "    ringtone: {ringtone},");
    let _ = writeln!(source, "    toggles: Toggles::from_bits({toggle_bits:#04x}),");
    let _ = writeln!(source, "    caller_id_mode: CallerIdMode::{caller_id:?},");
    let _ = writeln!(source, "    security_code: {code:?},");
    let _ = writeln!(source, "    paired_device_name: {bt_name:?},");
    let _ = writeln!(source, "    tetris_initials: *b{initials:?},");
    let _ = writeln!(source, "    directory_seed: [");
    source.push_str(&seeds);
    let _ = writeln!(source, "    ],");
    let _ = writeln!(source, "}};");
    source
}

fn render_seeds(config: &toml::Value, errors: &mut Vec<String>) -> String {
    let Some(entries) = config.get("directory").and_then(toml::Value::as_array) else {
        errors.push("[[directory]] entries missing".to_string());
        return String::new();
    };
    if entries.len() != SEED_ENTRY_COUNT {
        errors.push(format!(
            "[[directory]] needs exactly {SEED_ENTRY_COUNT} entries, found {}",
            entries.len()
        ));
    }

    let mut used = Vec::new();
    let mut source = String::new();
    for (i, entry) in entries.iter().enumerate() {
        let index = entry.get("index").and_then(toml::Value::as_integer).unwrap_or(-1);
        let name = entry.get("name").and_then(toml::Value::as_str).unwrap_or("");
        let number = entry.get("number").and_then(toml::Value::as_str).unwrap_or("");

        if !(0..DIRECTORY_SIZE).contains(&index) {
            errors.push(format!("directory entry {i}: index must be 0-{}", DIRECTORY_SIZE - 1));
        } else if used.contains(&index) {
            errors.push(format!("directory entry {i}: index {index} used twice"));
        }
        used.push(index);

        if name.is_empty() || name.len() > DIRECTORY_NAME_LEN || !is_printable(name) {
            errors.push(format!(
                "directory entry {i}: name must be 1-{DIRECTORY_NAME_LEN} printable chars"
            ));
        }
        if number.is_empty() || number.len() > DIRECTORY_NUMBER_SYMBOLS || !is_dialable(number) {
            errors.push(format!(
                "directory entry {i}: number must be 1-{DIRECTORY_NUMBER_SYMBOLS} of 0-9 * # P M"
            ));
        }

        let _ = writeln!(
            source,
            "        SeedEntry {{ index: {index}, name: {name:?}, number: {number:?} }},"
        );
    }
    source
}
