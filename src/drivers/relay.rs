//! Relay output driver.
//!
//! A dumb actuator: the safety decision lives in the supervisor.  The
//! level is written on every call, not just on change, so a pin that was
//! disturbed (brown-out, ESD) is re-asserted on the next tick.
//!
//! Generic over `embedded_hal::digital::OutputPin`, so the same driver
//! runs on an ESP-IDF `PinDriver` and on a host mock.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct Relay<PIN> {
    pin: PIN,
    name: &'static str,
    active_low: bool,
    on: bool,
    write_errors: u32,
}

impl<PIN: OutputPin> Relay<PIN> {
    /// Wrap `pin` and drive it to the de-energised level straight away.
    pub fn new(pin: PIN, name: &'static str, active_low: bool) -> Self {
        let mut relay = Self {
            pin,
            name,
            active_low,
            on: false,
            write_errors: 0,
        };
        relay.set(false);
        relay
    }

    pub fn set(&mut self, on: bool) {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            self.write_errors = self.write_errors.wrapping_add(1);
            warn!("Relay {}: GPIO write failed: {:?}", self.name, e);
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn pin(&self) -> &PIN {
        &self.pin
    }
}
