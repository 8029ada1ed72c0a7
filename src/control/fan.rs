//! Circulation fan: hysteresis on the top/bottom air temperature spread.
//!
//! ```text
//!   spread >  on_delta   → on
//!   spread <  off_delta  → off
//!   otherwise            → hold
//! ```

use crate::app::ports::Millis;
use crate::config::SmokerConfig;
use crate::safety::SafetyVerdict;
use crate::sensors::channel::SensorReading;

use super::ActuatorState;

/// Next fan state for a given spread.  Inside the dead band the previous
/// state is held.
pub fn hysteresis(was_on: bool, spread: i64, on_delta: i32, off_delta: i32) -> bool {
    if spread > i64::from(on_delta) {
        true
    } else if spread < i64::from(off_delta) {
        false
    } else {
        was_on
    }
}

pub struct FanController {
    on_delta: i32,
    off_delta: i32,
    min_dwell_ms: Millis,
    state: ActuatorState,
}

impl FanController {
    pub fn new(config: &SmokerConfig) -> Self {
        Self {
            on_delta: config.fan_on_delta,
            off_delta: config.fan_off_delta,
            min_dwell_ms: config.fan_min_dwell_ms,
            state: ActuatorState::off(),
        }
    }

    pub fn update(
        &mut self,
        verdict: &SafetyVerdict,
        top: &SensorReading,
        bottom: &SensorReading,
        now: Millis,
    ) -> bool {
        if !verdict.control_permitted || !(top.valid && bottom.valid) {
            self.state.drive(false, now);
            return false;
        }

        let spread = (i64::from(top.value) - i64::from(bottom.value)).abs();
        let want = hysteresis(self.state.enabled, spread, self.on_delta, self.off_delta);
        if want != self.state.enabled && self.state.dwell_elapsed(now, self.min_dwell_ms) {
            self.state.drive(want, now);
        }
        self.state.enabled
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }
}
