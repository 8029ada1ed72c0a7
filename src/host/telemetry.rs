//! Periodic telemetry records.
//!
//! Wire format: one flat JSON object per line.
//!
//! ```text
//! {"timestamp":61000,"temp_air_top":226,"temp_air_bottom":241,"temp_meat":148,
//!  "cooking_state":"ON","heater_state":"ON","fan_state":"OFF",
//!  "smoker_state":"OFF","smoker_rate":30,"safety":"none"}
//! ```
//!
//! Temperatures are whole °F, offsets applied.  A channel without a
//! valid reading (faulted, stale or never sampled) reports
//! [`MAX_REPORTED_TEMP`], the same 999 a floating thermocouple reads.
//! On/off tags are the literal strings `"ON"` and `"OFF"`.  `safety` carries the supervisor's
//! verdict reason; receivers that only know the base field set ignore it.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::Millis;
use crate::config::SmokerConfig;
use crate::error::CommsError;
use crate::safety::VerdictReason;
use crate::sensors::channel::{ChannelId, MAX_REPORTED_TEMP};
use crate::shared::{SessionState, SharedState, StatusSnapshot};

use super::transport::{Transport, write_all_or_drop};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnOff {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl From<bool> for OnOff {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl OnOff {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: Millis,
    pub temp_air_top: i32,
    pub temp_air_bottom: i32,
    pub temp_meat: i32,
    pub cooking_state: OnOff,
    pub heater_state: OnOff,
    pub fan_state: OnOff,
    pub smoker_state: OnOff,
    pub smoker_rate: u8,
    pub safety: VerdictReason,
}

impl TelemetryRecord {
    pub fn from_status(now: Millis, status: &StatusSnapshot, session: &SessionState) -> Self {
        let temp = |id: ChannelId| {
            let r = &status.readings[id.index()];
            if r.valid { r.value } else { MAX_REPORTED_TEMP }
        };
        let a = &status.actuators;
        Self {
            timestamp: now,
            temp_air_top: temp(ChannelId::Top),
            temp_air_bottom: temp(ChannelId::Bottom),
            temp_meat: temp(ChannelId::Meat),
            cooking_state: session.cooking_active.into(),
            heater_state: a.heater.enabled.into(),
            fan_state: a.fan.enabled.into(),
            smoker_state: a.smoker.output.enabled.into(),
            smoker_rate: a.smoker.duty_rate,
            safety: status.verdict.reason,
        }
    }

    /// Serialise as one newline-terminated line.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Parse one line produced by [`encode`](Self::encode).
    pub fn decode(line: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    NotDue,
    Sent,
    /// The output buffer could not take the whole record.
    Dropped,
}

/// Emits a [`TelemetryRecord`] every `telemetry_interval_ms` and signals
/// the much slower link-buffer hygiene period.
pub struct TelemetryPublisher {
    interval_ms: Millis,
    flush_interval_ms: Millis,
    next_emit_at: Millis,
    next_flush_at: Millis,
    dropped: u32,
}

impl TelemetryPublisher {
    pub fn new(config: &SmokerConfig) -> Self {
        Self {
            interval_ms: config.telemetry_interval_ms,
            flush_interval_ms: config.buffer_flush_interval_ms,
            next_emit_at: 0,
            next_flush_at: config.buffer_flush_interval_ms,
            dropped: 0,
        }
    }

    /// Publish a record if one is due.  Never blocks.
    pub fn poll(
        &mut self,
        now: Millis,
        shared: &SharedState,
        transport: &mut impl Transport,
    ) -> Result<PublishOutcome, CommsError> {
        if now < self.next_emit_at {
            return Ok(PublishOutcome::NotDue);
        }
        self.next_emit_at = now + self.interval_ms;

        let record = TelemetryRecord::from_status(now, &shared.status(), &shared.session());
        let line = match record.encode() {
            Ok(line) => line,
            Err(e) => {
                warn!("Telemetry: encode failed: {e}");
                return Ok(PublishOutcome::Dropped);
            }
        };

        if write_all_or_drop(transport, &line)? {
            Ok(PublishOutcome::Sent)
        } else {
            self.dropped = self.dropped.wrapping_add(1);
            debug!("Telemetry: output buffer full, record dropped ({} total)", self.dropped);
            Ok(PublishOutcome::Dropped)
        }
    }

    /// True once per `buffer_flush_interval_ms`.
    pub fn flush_due(&mut self, now: Millis) -> bool {
        if now < self.next_flush_at {
            return false;
        }
        self.next_flush_at = now + self.flush_interval_ms;
        true
    }

    /// Records dropped for lack of output space since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
