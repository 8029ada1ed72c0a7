//! Actuator controllers.
//!
//! Three independent state machines, one per relay.  Each takes the
//! supervisor's verdict as a hard override: when control is not permitted
//! the output is driven off in the same tick, ignoring any dwell time.

pub mod fan;
pub mod heater;
pub mod smoker;

use core::fmt;

use crate::app::ports::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Heater,
    Fan,
    Smoker,
}

impl Actuator {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heater => "heater",
            Self::Fan => "fan",
            Self::Smoker => "smoker",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub enabled: bool,
    pub last_transition_at: Millis,
}

impl ActuatorState {
    pub const fn off() -> Self {
        Self {
            enabled: false,
            last_transition_at: 0,
        }
    }

    /// Set the output; returns `true` if it changed.
    pub fn drive(&mut self, on: bool, now: Millis) -> bool {
        if self.enabled == on {
            return false;
        }
        self.enabled = on;
        self.last_transition_at = now;
        true
    }

    /// Whether a voluntary transition is allowed after `min_dwell_ms`.
    pub fn dwell_elapsed(&self, now: Millis, min_dwell_ms: Millis) -> bool {
        now.saturating_sub(self.last_transition_at) >= min_dwell_ms
    }
}

/// Smoke generator output plus its (clamped) duty rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmokerState {
    pub output: ActuatorState,
    /// Percent, always within `0..=100`.
    pub duty_rate: u8,
}

impl SmokerState {
    pub const fn off() -> Self {
        Self {
            output: ActuatorState::off(),
            duty_rate: 0,
        }
    }
}

/// All three outputs after a control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorSnapshot {
    pub heater: ActuatorState,
    pub fan: ActuatorState,
    pub smoker: SmokerState,
}

impl ActuatorSnapshot {
    pub const fn all_off() -> Self {
        Self {
            heater: ActuatorState::off(),
            fan: ActuatorState::off(),
            smoker: SmokerState::off(),
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.heater.enabled || self.fan.enabled || self.smoker.output.enabled
    }

    pub fn enabled(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Heater => self.heater.enabled,
            Actuator::Fan => self.fan.enabled,
            Actuator::Smoker => self.smoker.output.enabled,
        }
    }
}
