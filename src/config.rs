//! System configuration parameters
//!
//! All tunable parameters for the smoker controller. Values are fixed at
//! build time through [`SmokerConfig::default`]; nothing is persisted.
//! Temperatures are whole degrees Fahrenheit, durations milliseconds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the supervisor recovers from an over-temperature trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverTempPolicy {
    /// Control resumes on the first tick every reading is back in range.
    AutoRecover,
    /// The trip holds until the cooking session is restarted.
    Latched,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokerConfig {
    // --- Fan ---
    /// Top/bottom spread (°F) above which the fan switches on
    pub fan_on_delta: i32,
    /// Top/bottom spread (°F) below which the fan switches off
    pub fan_off_delta: i32,
    /// Minimum time between voluntary fan transitions (0 = no dwell)
    pub fan_min_dwell_ms: u64,

    // --- Heater ---
    /// Minimum time between voluntary heater relay transitions (0 = no dwell)
    pub heater_min_cycle_ms: u64,

    // --- Smoker ---
    /// Duty-cycle period of the smoke generator
    pub smoker_cycle_length_ms: u64,

    // --- Safety ---
    /// Any valid reading above this trips the over-temperature verdict
    pub max_safe_temp: i32,
    /// Recovery behaviour after an over-temperature trip
    pub overtemp_policy: OverTempPolicy,
    /// Longest tolerated gap since the last successful acquisition
    pub sensor_timeout_ms: u64,
    /// Cooking session lapses this long after the last keep-alive
    pub session_timeout_ms: u64,
    /// Longest tolerated silence from the partner task before the
    /// watchdog refresh is withheld
    pub liveness_staleness_window_ms: u64,

    // --- Probes ---
    /// Calibration offsets added to top, bottom and meat readings
    pub probe_offsets: [i32; 3],

    // --- Timing ---
    /// Control task end-of-tick delay
    pub control_tick_ms: u64,
    /// Communication task end-of-tick delay
    pub comm_tick_ms: u64,
    /// Telemetry record period
    pub telemetry_interval_ms: u64,
    /// Host link buffer clear period
    pub buffer_flush_interval_ms: u64,
}

impl Default for SmokerConfig {
    fn default() -> Self {
        Self {
            // Fan
            fan_on_delta: 30,
            fan_off_delta: 15,
            fan_min_dwell_ms: 0,

            // Heater
            heater_min_cycle_ms: 0,

            // Smoker
            smoker_cycle_length_ms: 10_000,

            // Safety
            max_safe_temp: 300,
            overtemp_policy: OverTempPolicy::AutoRecover,
            sensor_timeout_ms: 5_000,
            session_timeout_ms: 30_000,
            liveness_staleness_window_ms: 2_000,

            // Probes (°F needed to read 32 in ice water)
            probe_offsets: [3, 3, 0],

            // Timing
            control_tick_ms: 100,           // 10 Hz
            comm_tick_ms: 20,               // 50 Hz
            telemetry_interval_ms: 1_000,   // 1 Hz
            buffer_flush_interval_ms: 600_000,
        }
    }
}

impl SmokerConfig {
    /// Reject parameter combinations the control loop cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.fan_off_delta >= self.fan_on_delta {
            return Err(Error::Config("fan_off_delta must be below fan_on_delta"));
        }
        if self.fan_off_delta < 0 {
            return Err(Error::Config("fan_off_delta must not be negative"));
        }
        if self.smoker_cycle_length_ms == 0 {
            return Err(Error::Config("smoker_cycle_length_ms must be non-zero"));
        }
        if self.control_tick_ms == 0 || self.comm_tick_ms == 0 {
            return Err(Error::Config("task tick periods must be non-zero"));
        }
        let slowest_tick = self.control_tick_ms.max(self.comm_tick_ms);
        if self.liveness_staleness_window_ms < 2 * slowest_tick {
            return Err(Error::Config(
                "liveness window must cover at least two ticks of the slower task",
            ));
        }
        if self.telemetry_interval_ms <= self.comm_tick_ms {
            return Err(Error::Config("telemetry_interval_ms must exceed comm_tick_ms"));
        }
        if self.buffer_flush_interval_ms <= self.telemetry_interval_ms {
            return Err(Error::Config(
                "buffer_flush_interval_ms must exceed telemetry_interval_ms",
            ));
        }
        if self.session_timeout_ms == 0 || self.sensor_timeout_ms == 0 {
            return Err(Error::Config("timeouts must be non-zero"));
        }
        Ok(())
    }
}
