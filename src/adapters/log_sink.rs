//! Event sink adapters.
//!
//! [`LogEventSink`] writes every [`AppEvent`] to the `log` facade (UART
//! console on the device).  [`LinkEventSink`] additionally queues the
//! event for the communication task, which forwards it to the host as a
//! `#` diagnostic line.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::safety::VerdictReason;
use crate::shared::SharedState;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SensorFault(_)
            | AppEvent::SessionExpired
            | AppEvent::WatchdogWithheld { .. } => warn!("EVENT | {event}"),
            AppEvent::VerdictChanged { to, .. } if *to != VerdictReason::None => warn!("EVENT | {event}"),
            _ => info!("EVENT | {event}"),
        }
    }
}

/// Logs the event and queues it as a host diagnostic.
///
/// The queue is bounded; when the comm task falls behind new events are
/// dropped and the oldest ones kept.
pub struct LinkEventSink {
    shared: Arc<SharedState>,
    log: LogEventSink,
    dropped: u32,
}

impl LinkEventSink {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self {
            shared,
            log: LogEventSink,
            dropped: 0,
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl EventSink for LinkEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        if self.shared.diagnostics.try_send(*event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            debug!("Diagnostics queue full, dropped: {event}");
        }
    }
}
