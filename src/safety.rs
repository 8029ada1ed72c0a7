//! Safety supervisor.
//!
//! The supervisor runs **every control tick after acquisition and before
//! the actuator controllers** and folds sensor validity, sensor age,
//! over-temperature and session state into a single [`SafetyVerdict`].
//!
//! ## Verdict order
//!
//! 1. A required channel is invalid → `SensorInvalid`.
//! 2. The oldest successful read of the required channels is older than
//!    `sensor_timeout_ms` → `SensorStale`.
//! 3. Any valid reading exceeds `max_safe_temp` → `OverTemp`.
//! 4. No cooking session is active → `SessionExpired`.
//! 5. Otherwise control is permitted.
//!
//! Absence of proof of safety is treated as unsafe: a channel that has
//! never been read is invalid, and every verdict other than `None`
//! forbids control.
//!
//! ## Over-temperature recovery
//!
//! With [`OverTempPolicy::AutoRecover`] the verdict is recomputed from
//! scratch every tick.  With [`OverTempPolicy::Latched`] an over-temperature
//! trip holds until a new cooking session is started (the session epoch
//! advances).

use core::fmt;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::Millis;
use crate::config::{OverTempPolicy, SmokerConfig};
use crate::sensors::channel::SensorReading;
use crate::shared::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    None,
    SensorInvalid,
    SensorStale,
    OverTemp,
    SessionExpired,
}

impl VerdictReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SensorInvalid => "sensor_invalid",
            Self::SensorStale => "sensor_stale",
            Self::OverTemp => "over_temp",
            Self::SessionExpired => "session_expired",
        }
    }
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tick decision on whether any actuator may be energised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub control_permitted: bool,
    pub reason: VerdictReason,
}

impl SafetyVerdict {
    pub const PERMITTED: Self = Self {
        control_permitted: true,
        reason: VerdictReason::None,
    };

    pub const fn forbidden(reason: VerdictReason) -> Self {
        Self {
            control_permitted: false,
            reason,
        }
    }

    pub const fn from_reason(reason: VerdictReason) -> Self {
        match reason {
            VerdictReason::None => Self::PERMITTED,
            other => Self::forbidden(other),
        }
    }
}

/// Stateless assessment of one tick's inputs.
pub fn assess(
    readings: &[SensorReading],
    cooking_active: bool,
    now: Millis,
    max_safe_temp: i32,
    sensor_timeout_ms: Millis,
) -> VerdictReason {
    let required = || readings.iter().filter(|r| r.channel.is_required());

    if required().any(|r| !r.valid) {
        return VerdictReason::SensorInvalid;
    }

    let oldest = required().filter_map(|r| r.last_valid_at).min();
    match oldest {
        None => return VerdictReason::SensorInvalid,
        Some(t) if now.saturating_sub(t) > sensor_timeout_ms => {
            return VerdictReason::SensorStale;
        }
        Some(_) => {}
    }

    if readings.iter().any(|r| r.valid && r.value > max_safe_temp) {
        return VerdictReason::OverTemp;
    }

    if !cooking_active {
        return VerdictReason::SessionExpired;
    }

    VerdictReason::None
}

/// Safety supervisor.
pub struct SafetySupervisor {
    max_safe_temp: i32,
    sensor_timeout_ms: Millis,
    policy: OverTempPolicy,
    /// Session epoch in which a latched over-temperature trip happened.
    latched_epoch: Option<u32>,
}

impl SafetySupervisor {
    pub fn new(config: &SmokerConfig) -> Self {
        Self {
            max_safe_temp: config.max_safe_temp,
            sensor_timeout_ms: config.sensor_timeout_ms,
            policy: config.overtemp_policy,
            latched_epoch: None,
        }
    }

    /// Evaluate this tick's verdict.
    pub fn evaluate(
        &mut self,
        readings: &[SensorReading],
        session: &SessionState,
        now: Millis,
    ) -> SafetyVerdict {
        let mut reason = assess(
            readings,
            session.cooking_active,
            now,
            self.max_safe_temp,
            self.sensor_timeout_ms,
        );

        if self.policy == OverTempPolicy::Latched {
            reason = self.apply_latch(reason, session.epoch);
        }

        SafetyVerdict::from_reason(reason)
    }

    fn apply_latch(&mut self, reason: VerdictReason, epoch: u32) -> VerdictReason {
        if reason == VerdictReason::OverTemp {
            if self.latched_epoch != Some(epoch) {
                error!("SAFETY: over-temperature latched (session epoch {epoch})");
            }
            self.latched_epoch = Some(epoch);
            return reason;
        }

        match self.latched_epoch {
            Some(e) if e != epoch => {
                info!("SAFETY: over-temperature latch released by new session");
                self.latched_epoch = None;
                reason
            }
            Some(_) if matches!(reason, VerdictReason::None | VerdictReason::SessionExpired) => {
                VerdictReason::OverTemp
            }
            _ => reason,
        }
    }

    /// True while a latched over-temperature trip is holding.
    pub fn is_latched(&self) -> bool {
        self.latched_epoch.is_some()
    }
}
