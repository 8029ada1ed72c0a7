//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                    |
//! |------------|--------------|--------------------------------|
//! | `hardware` | ActuatorPort | heater / fan / smoker relays   |
//! | `log_sink` | EventSink    | serial log, host diagnostics   |
//! | `serial`   | Transport    | UART0 host link (device only)  |
//! | `time`     | Clock        | ESP32 system timer             |
//!
//! The thermocouple adapter lives with the sensors
//! ([`crate::sensors::max31856`]).

pub mod hardware;
pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod serial;
pub mod time;
