//! Fuzz target: `Command::parse`
//!
//! Any line either parses or is rejected; a parsed rate or flag must
//! come from a recognised prefix.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use smokehouse::app::commands::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cmd) = Command::parse(line) {
        let prefix = match cmd {
            Command::SetHeaterEnable(_) => "HEATER_STATE",
            Command::SetSmokerRate(_) => "SMOKER_RATE",
            Command::SetSessionActive(_) => "COOKING_STATE",
        };
        assert!(line.trim_start().starts_with(prefix));
    }
});
