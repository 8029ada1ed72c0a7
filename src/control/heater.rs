//! Heating element: a safety gate on the host-set enable target.
//!
//! Thermal decisions belong to the host; this controller only passes the
//! target through when the supervisor permits control.

use crate::app::ports::Millis;
use crate::config::SmokerConfig;
use crate::safety::SafetyVerdict;

use super::ActuatorState;

pub struct HeaterController {
    min_cycle_ms: Millis,
    state: ActuatorState,
}

impl HeaterController {
    pub fn new(config: &SmokerConfig) -> Self {
        Self {
            min_cycle_ms: config.heater_min_cycle_ms,
            state: ActuatorState::off(),
        }
    }

    pub fn update(&mut self, verdict: &SafetyVerdict, target: bool, now: Millis) -> bool {
        if !verdict.control_permitted {
            self.state.drive(false, now);
            return false;
        }
        if target != self.state.enabled && self.state.dwell_elapsed(now, self.min_cycle_ms) {
            self.state.drive(target, now);
        }
        self.state.enabled
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }
}
