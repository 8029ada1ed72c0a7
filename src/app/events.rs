//! Outbound application events.
//!
//! The control and communication tasks emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide where they go (console log, host diagnostics).
//!
//! Events describe *edges* (something changed); steady state is never
//! re-emitted tick after tick.

use core::fmt;

use crate::control::Actuator;
use crate::liveness::TaskId;
use crate::safety::VerdictReason;
use crate::sensors::channel::{ChannelId, FaultReport};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The control service has started.
    Started,

    /// A channel started faulting, or its fault set changed.
    SensorFault(FaultReport),

    /// A previously faulted channel acquired cleanly again.
    SensorRecovered(ChannelId),

    /// The supervisor's verdict changed.
    VerdictChanged { from: VerdictReason, to: VerdictReason },

    /// A relay changed state.
    ActuatorChanged { actuator: Actuator, on: bool },

    /// The cooking session lapsed without a keep-alive.
    SessionExpired,

    /// `by` stopped refreshing the watchdog because its partner is stale.
    WatchdogWithheld { by: TaskId },

    /// `by` resumed refreshing the watchdog.
    WatchdogResumed { by: TaskId },
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("controller started"),
            Self::SensorFault(r) => write!(f, "sensor {} fault: {}", r.channel, r.code),
            Self::SensorRecovered(ch) => write!(f, "sensor {ch} recovered"),
            Self::VerdictChanged { from, to } => write!(f, "verdict {from} -> {to}"),
            Self::ActuatorChanged { actuator, on } => {
                write!(f, "{actuator} {}", if *on { "ON" } else { "OFF" })
            }
            Self::SessionExpired => f.write_str("session expired"),
            Self::WatchdogWithheld { by } => {
                write!(f, "watchdog withheld by {by}: {} task stalled", by.partner())
            }
            Self::WatchdogResumed { by } => write!(f, "watchdog resumed by {by}"),
        }
    }
}
