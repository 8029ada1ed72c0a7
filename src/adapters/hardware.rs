//! Hardware adapter: the three relays behind [`ActuatorPort`].
//!
//! This and the thermocouple driver are the only code that touches
//! actual pins.  On the host the pins are mocks.

use embedded_hal::digital::OutputPin;

use crate::app::ports::ActuatorPort;
use crate::drivers::relay::Relay;

pub struct RelayBank<H, F, S> {
    heater: Relay<H>,
    fan: Relay<F>,
    smoker: Relay<S>,
}

impl<H: OutputPin, F: OutputPin, S: OutputPin> RelayBank<H, F, S> {
    pub fn new(heater: Relay<H>, fan: Relay<F>, smoker: Relay<S>) -> Self {
        Self { heater, fan, smoker }
    }

    /// Relay states as last commanded (heater, fan, smoker).
    pub fn states(&self) -> (bool, bool, bool) {
        (self.heater.is_on(), self.fan.is_on(), self.smoker.is_on())
    }

    pub fn write_errors(&self) -> u32 {
        self.heater.write_errors() + self.fan.write_errors() + self.smoker.write_errors()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<H: OutputPin, F: OutputPin, S: OutputPin> ActuatorPort for RelayBank<H, F, S> {
    fn set_heater(&mut self, on: bool) {
        self.heater.set(on);
    }

    fn set_fan(&mut self, on: bool) {
        self.fan.set(on);
    }

    fn set_smoker(&mut self, on: bool) {
        self.smoker.set(on);
    }
}
