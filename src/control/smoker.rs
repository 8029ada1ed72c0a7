//! Smoke generator: fixed-period duty cycle.
//!
//! The phase is derived from the monotonic clock (`now mod cycle`), not
//! from when the rate last changed.  A rate change therefore applies on
//! the very next evaluation and may produce one partial on/off slice.

use crate::app::ports::Millis;
use crate::config::SmokerConfig;
use crate::safety::SafetyVerdict;

use super::SmokerState;

/// Clamp a host-supplied rate into `0..=100`.
pub fn clamp_rate(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Output of the duty cycle at `now`.
pub fn duty_output(now: Millis, duty_rate: u8, cycle_ms: Millis) -> bool {
    if duty_rate == 0 {
        return false;
    }
    if duty_rate >= 100 || cycle_ms == 0 {
        return duty_rate >= 100;
    }
    let on_time = cycle_ms * u64::from(duty_rate) / 100;
    now % cycle_ms < on_time
}

pub struct SmokerController {
    cycle_ms: Millis,
    state: SmokerState,
}

impl SmokerController {
    pub fn new(config: &SmokerConfig) -> Self {
        Self {
            cycle_ms: config.smoker_cycle_length_ms,
            state: SmokerState::off(),
        }
    }

    pub fn update(&mut self, verdict: &SafetyVerdict, rate_target: i32, now: Millis) -> bool {
        self.state.duty_rate = clamp_rate(rate_target);
        let on = verdict.control_permitted && duty_output(now, self.state.duty_rate, self.cycle_ms);
        self.state.output.drive(on, now);
        on
    }

    pub fn state(&self) -> SmokerState {
        self.state
    }
}
