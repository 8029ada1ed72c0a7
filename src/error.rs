//! Unified error types for the smoker firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! bootstrap and task loops' error handling uniform. All variants are `Copy`
//! so they can be passed between tasks without allocation.

use core::fmt;

use crate::sensors::channel::FaultCode;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A thermocouple channel reported one or more fault conditions.
    Sensor(FaultCode),
    /// The host link failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(code) => write!(f, "sensor: {code}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<FaultCode> for Error {
    fn from(code: FaultCode) -> Self {
        Self::Sensor(code)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The driver returned an error code.
    Io(i32),
    /// No peer is attached to the link.
    Disconnected,
    /// The output buffer cannot take the record.
    Overflow,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(code) => write!(f, "I/O error {code}"),
            Self::Disconnected => write!(f, "link disconnected"),
            Self::Overflow => write!(f, "output buffer full"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
