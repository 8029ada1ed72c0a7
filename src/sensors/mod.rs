//! Sensor subsystem — thermocouple channels and the aggregating [`SensorHub`].
//!
//! The hub owns the three temperature channels and produces an
//! [`Acquisition`] each control tick: one [`SensorReading`] per channel
//! plus a [`FaultReport`] for every channel that failed this tick.

pub mod channel;
pub mod max31856;

use heapless::Vec;

use crate::app::ports::{Millis, ThermocouplePort};
use channel::{ChannelId, FaultReport, SensorChannel, SensorReading};

/// Result of one acquisition pass over every channel.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub readings: [SensorReading; ChannelId::COUNT],
    pub faults: Vec<FaultReport, { ChannelId::COUNT }>,
}

impl Acquisition {
    pub fn reading(&self, id: ChannelId) -> &SensorReading {
        &self.readings[id.index()]
    }
}

/// Aggregates the top, bottom and meat channels.
pub struct SensorHub<P> {
    channels: [SensorChannel<P>; ChannelId::COUNT],
}

impl<P: ThermocouplePort> SensorHub<P> {
    /// `offsets` are the calibration offsets for top, bottom and meat.
    pub fn new(top: P, bottom: P, meat: P, offsets: [i32; ChannelId::COUNT]) -> Self {
        Self {
            channels: [
                SensorChannel::new(ChannelId::Top, top, offsets[0]),
                SensorChannel::new(ChannelId::Bottom, bottom, offsets[1]),
                SensorChannel::new(ChannelId::Meat, meat, offsets[2]),
            ],
        }
    }

    /// Age advisory channels out after `ms` without a fresh sample.
    /// Required channels are left to the supervisor's stale check.
    pub fn set_advisory_timeout(&mut self, ms: Millis) {
        for ch in &mut self.channels {
            if !ch.id().is_required() {
                ch.set_stale_after(Some(ms));
            }
        }
    }

    /// Release every fault latched by the previous tick so this tick's
    /// acquisition samples the probes again.
    pub fn clear_faults(&mut self) {
        for ch in &mut self.channels {
            ch.clear_fault();
        }
    }

    /// Acquire every channel once.
    ///
    /// A failing channel never aborts the pass; its previous value is kept,
    /// it is marked invalid and its report is collected.
    pub fn acquire_all(&mut self, now: Millis) -> Acquisition {
        let mut faults = Vec::new();
        for ch in &mut self.channels {
            if let Err(report) = ch.acquire(now) {
                // Capacity equals the channel count.
                let _ = faults.push(report);
            }
        }
        Acquisition {
            readings: self.readings(),
            faults,
        }
    }

    pub fn readings(&self) -> [SensorReading; ChannelId::COUNT] {
        [
            self.channels[0].reading(),
            self.channels[1].reading(),
            self.channels[2].reading(),
        ]
    }
}
