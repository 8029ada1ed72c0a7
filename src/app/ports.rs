//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService / CommTask (domain)
//! ```
//!
//! Driven adapters (thermocouples, relays, watchdog, clock, event sinks)
//! implement these traits.  The domain consumes them via generics, so the
//! control core never touches hardware directly and every timing decision
//! can be driven by an injected clock in tests.

use std::sync::Arc;

use crate::sensors::channel::FaultCode;

/// Monotonic milliseconds since boot.
pub type Millis = u64;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    fn now_ms(&self) -> Millis;
}

// ───────────────────────────────────────────────────────────────
// Thermocouple port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One temperature source.
pub trait ThermocouplePort {
    /// Sample the probe without blocking.
    ///
    /// * `Ok(Some(°F))`: a fresh conversion.
    /// * `Ok(None)`: no new conversion is ready yet.
    /// * `Err(code)`: the probe or its bus reported a fault.
    fn sample(&mut self) -> Result<Option<i32>, FaultCode>;

    /// Reset the probe's own fault latch, if it has one.
    fn clear_fault(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the relays.
pub trait ActuatorPort {
    fn set_heater(&mut self, on: bool);

    fn set_fan(&mut self, on: bool);

    fn set_smoker(&mut self, on: bool);

    /// De-energise every relay.
    fn all_off(&mut self) {
        self.set_heater(false);
        self.set_fan(false);
        self.set_smoker(false);
    }
}

// ───────────────────────────────────────────────────────────────
// Watchdog port
// ───────────────────────────────────────────────────────────────

/// The hardware watchdog shared by both tasks.
pub trait WatchdogPort {
    /// Refresh the watchdog.  Not calling this for longer than the
    /// hardware timeout resets the chip.
    fn feed(&self);
}

impl<W: WatchdogPort + ?Sized> WatchdogPort for Arc<W> {
    fn feed(&self) {
        (**self).feed();
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / host link)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// diagnostic lines on the host link, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
