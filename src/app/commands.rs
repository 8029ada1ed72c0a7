//! Inbound host commands.
//!
//! One command per line, first match wins on the prefix:
//!
//! | Prefix          | Payload | Command                  |
//! |-----------------|---------|--------------------------|
//! | `HEATER_STATE`  | `0`/`1` | [`Command::SetHeaterEnable`] |
//! | `SMOKER_RATE`   | integer | [`Command::SetSmokerRate`]   |
//! | `COOKING_STATE` | `0`/`1` | [`Command::SetSessionActive`] |
//!
//! The parser is strict: a recognised prefix with a bad payload is
//! [`ParseError::Malformed`], never silently treated as `0`.

use core::fmt;

/// Commands the host can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Heater enable target.
    SetHeaterEnable(bool),

    /// Smoke duty rate target in percent.  Not clamped here; the smoker
    /// controller clamps to `0..=100`.
    SetSmokerRate(i32),

    /// Start (and keep alive) or stop the cooking session.
    SetSessionActive(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No known prefix; the line is ignored.
    UnknownCommand,
    /// Known prefix, unparseable payload.
    Malformed,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::Malformed => write!(f, "malformed payload"),
        }
    }
}

const HEATER_STATE: &str = "HEATER_STATE";
const SMOKER_RATE: &str = "SMOKER_RATE";
const COOKING_STATE: &str = "COOKING_STATE";

impl Command {
    /// Parse one line (without its terminator).
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(HEATER_STATE) {
            parse_flag(rest).map(Self::SetHeaterEnable)
        } else if let Some(rest) = line.strip_prefix(SMOKER_RATE) {
            parse_int(rest).map(Self::SetSmokerRate)
        } else if let Some(rest) = line.strip_prefix(COOKING_STATE) {
            parse_flag(rest).map(Self::SetSessionActive)
        } else {
            Err(ParseError::UnknownCommand)
        }
    }
}

/// The payload must be separated from the prefix by whitespace.
fn payload(rest: &str) -> Result<&str, ParseError> {
    if !rest.starts_with(char::is_whitespace) {
        return Err(ParseError::Malformed);
    }
    Ok(rest.trim())
}

fn parse_int(rest: &str) -> Result<i32, ParseError> {
    payload(rest)?.parse::<i32>().map_err(|_| ParseError::Malformed)
}

fn parse_flag(rest: &str) -> Result<bool, ParseError> {
    match payload(rest)? {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ParseError::Malformed),
    }
}
