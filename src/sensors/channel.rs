//! One thermocouple channel and its fault model.
//!
//! A channel wraps a [`ThermocouplePort`] and turns raw samples into a
//! [`SensorReading`].  A failed sample latches a [`FaultCode`] on the
//! channel; until the owner calls [`SensorChannel::clear_fault`] every
//! acquisition reports that fault again without touching the probe, so a
//! faulted probe can never produce a `valid` reading by accident.

use core::fmt;

use crate::app::ports::{Millis, ThermocouplePort};

/// Runaway readings (a floating thermocouple input) are clamped here.
pub const MAX_REPORTED_TEMP: i32 = 999;

// ---------------------------------------------------------------------------
// Channel identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelId {
    /// Air temperature near the top of the cabinet.
    Top = 0,
    /// Air temperature near the heating element.
    Bottom = 1,
    /// Meat probe.
    Meat = 2,
}

impl ChannelId {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::Top, Self::Bottom, Self::Meat];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Required channels gate control; the meat probe is advisory and may
    /// be unplugged without stopping the cook.
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Meat => "meat",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Fault flags
// ---------------------------------------------------------------------------

/// Individual acquisition fault conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultKind {
    /// Reading above the converter's high fault threshold.
    ThresholdHigh = 0b0000_0001,
    /// Reading below the converter's low fault threshold.
    ThresholdLow = 0b0000_0010,
    /// Cold-junction reference out of its operating range.
    ReferenceBias = 0b0000_0100,
    /// Thermocouple open or disconnected.
    OpenCircuit = 0b0000_1000,
    /// Input under- or over-voltage.
    OverUnderVoltage = 0b0001_0000,
    /// Thermocouple voltage outside the linearisation range.
    OutOfRange = 0b0010_0000,
    /// The bus transaction itself failed.
    BusError = 0b0100_0000,
    /// No fresh conversion for longer than the channel's stale limit.
    Stale = 0b1000_0000,
}

impl FaultKind {
    pub const ALL: [Self; 8] = [
        Self::ThresholdHigh,
        Self::ThresholdLow,
        Self::ReferenceBias,
        Self::OpenCircuit,
        Self::OverUnderVoltage,
        Self::OutOfRange,
        Self::BusError,
        Self::Stale,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ThresholdHigh => "threshold-high",
            Self::ThresholdLow => "threshold-low",
            Self::ReferenceBias => "reference-bias",
            Self::OpenCircuit => "open-circuit",
            Self::OverUnderVoltage => "over-under-voltage",
            Self::OutOfRange => "out-of-range",
            Self::BusError => "bus-error",
            Self::Stale => "stale",
        }
    }
}

/// A set of [`FaultKind`] flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultCode(u8);

impl FaultCode {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, kind: FaultKind) -> bool {
        self.0 & kind.mask() != 0
    }

    pub fn insert(&mut self, kind: FaultKind) {
        self.0 |= kind.mask();
    }

    #[must_use]
    pub const fn with(self, kind: FaultKind) -> Self {
        Self(self.0 | kind.mask())
    }

    pub fn iter(self) -> impl Iterator<Item = FaultKind> {
        FaultKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<FaultKind> for FaultCode {
    fn from(kind: FaultKind) -> Self {
        Self(kind.mask())
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(kind.name())?;
        }
        Ok(())
    }
}

/// Produced when an acquisition fails; consumed the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultReport {
    pub channel: ChannelId,
    pub code: FaultCode,
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Latest state of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub channel: ChannelId,
    /// Whole degrees Fahrenheit, offset applied.
    pub value: i32,
    pub valid: bool,
    /// `None` until the first successful acquisition.
    pub last_valid_at: Option<Millis>,
}

impl SensorReading {
    pub const fn never_acquired(channel: ChannelId) -> Self {
        Self {
            channel,
            value: 0,
            valid: false,
            last_valid_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SensorChannel
// ---------------------------------------------------------------------------

pub struct SensorChannel<P> {
    probe: P,
    offset: i32,
    reading: SensorReading,
    latched: Option<FaultCode>,
    stale_after: Option<Millis>,
}

impl<P: ThermocouplePort> SensorChannel<P> {
    pub fn new(channel: ChannelId, probe: P, offset: i32) -> Self {
        Self {
            probe,
            offset,
            reading: SensorReading::never_acquired(channel),
            latched: None,
            stale_after: None,
        }
    }

    /// Report the channel as [`FaultKind::Stale`] once its last good sample
    /// is older than `ms`.  `None` leaves ageing to the caller.
    pub fn set_stale_after(&mut self, ms: Option<Millis>) {
        self.stale_after = ms;
    }

    pub fn id(&self) -> ChannelId {
        self.reading.channel
    }

    /// Sample the probe once.
    ///
    /// A pending conversion keeps the previous reading unchanged, which
    /// lets `last_valid_at` age towards the supervisor's stale timeout.
    /// With a stale limit set, a reading older than the limit is marked
    /// invalid and reported as [`FaultKind::Stale`] without latching.
    pub fn acquire(&mut self, now: Millis) -> Result<SensorReading, FaultReport> {
        if let Some(code) = self.latched {
            self.reading.valid = false;
            return Err(FaultReport {
                channel: self.id(),
                code,
            });
        }

        match self.probe.sample() {
            Ok(Some(raw)) => {
                self.reading.value = raw.saturating_add(self.offset).min(MAX_REPORTED_TEMP);
                self.reading.valid = true;
                self.reading.last_valid_at = Some(now);
                Ok(self.reading)
            }
            Ok(None) => match (self.stale_after, self.reading.last_valid_at) {
                (Some(limit), Some(t)) if now.saturating_sub(t) > limit => {
                    self.reading.valid = false;
                    Err(FaultReport {
                        channel: self.id(),
                        code: FaultKind::Stale.into(),
                    })
                }
                _ => Ok(self.reading),
            },
            Err(code) => {
                let code = if code.is_empty() {
                    FaultKind::BusError.into()
                } else {
                    code
                };
                self.latched = Some(code);
                self.reading.valid = false;
                Err(FaultReport {
                    channel: self.id(),
                    code,
                })
            }
        }
    }

    /// Drop the latched fault so the next acquisition samples the probe.
    /// Returns the fault that was latched, if any.
    pub fn clear_fault(&mut self) -> Option<FaultCode> {
        let latched = self.latched.take();
        if latched.is_some() {
            self.probe.clear_fault();
        }
        latched
    }

    pub fn is_faulted(&self) -> bool {
        self.latched.is_some()
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }
}
