//! State shared between the control and communication tasks.
//!
//! ```text
//!   CommTask ──targets/session──▶ SharedState ◀──status/session── ControlTask
//!            ◀──status, diag─────             ──────liveness──────▶
//! ```
//!
//! | Field              | Writer(s)        | Reader(s)        | Primitive              |
//! |--------------------|------------------|------------------|------------------------|
//! | heater target      | comm             | control          | `AtomicBool`           |
//! | smoker rate target | comm             | control          | `AtomicI32`            |
//! | session            | comm + control   | both             | critical-section mutex |
//! | status snapshot    | control          | comm             | critical-section mutex |
//! | liveness           | one slot per task| the other task   | 64-bit atomics         |
//! | diagnostics        | any event sink   | comm             | bounded channel        |
//!
//! The session is the only field with two writers.  Holding it behind a
//! mutex makes "activate and refresh keep-alive" and "expire if stale"
//! indivisible, so a keep-alive can never be lost between the expiry
//! check and the write.  Scalar targets may be read one tick late.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::Millis;
use crate::config::SmokerConfig;
use crate::control::ActuatorSnapshot;
use crate::liveness::LivenessMonitor;
use crate::safety::{SafetyVerdict, VerdictReason};
use crate::sensors::channel::{ChannelId, SensorReading};

/// Pending diagnostic events; the oldest are kept when full.
pub const DIAG_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub cooking_active: bool,
    pub last_keepalive_at: Millis,
    /// Advances each time an inactive session is started.
    pub epoch: u32,
}

impl SessionState {
    pub const fn inactive() -> Self {
        Self {
            cooking_active: false,
            last_keepalive_at: 0,
            epoch: 0,
        }
    }
}

/// What the control task last computed, for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub at: Millis,
    pub readings: [SensorReading; ChannelId::COUNT],
    pub actuators: ActuatorSnapshot,
    pub verdict: SafetyVerdict,
}

impl StatusSnapshot {
    pub const fn boot() -> Self {
        Self {
            at: 0,
            readings: [
                SensorReading::never_acquired(ChannelId::Top),
                SensorReading::never_acquired(ChannelId::Bottom),
                SensorReading::never_acquired(ChannelId::Meat),
            ],
            actuators: ActuatorSnapshot::all_off(),
            verdict: SafetyVerdict::forbidden(VerdictReason::SensorInvalid),
        }
    }
}

pub struct SharedState {
    heater_target: AtomicBool,
    smoker_rate_target: AtomicI32,
    session: CriticalSectionMutex<Cell<SessionState>>,
    status: CriticalSectionMutex<Cell<StatusSnapshot>>,
    pub liveness: LivenessMonitor,
    pub diagnostics: Channel<CriticalSectionRawMutex, AppEvent, DIAG_DEPTH>,
}

impl SharedState {
    pub fn new(config: &SmokerConfig) -> Self {
        Self {
            heater_target: AtomicBool::new(false),
            smoker_rate_target: AtomicI32::new(0),
            session: CriticalSectionMutex::new(Cell::new(SessionState::inactive())),
            status: CriticalSectionMutex::new(Cell::new(StatusSnapshot::boot())),
            liveness: LivenessMonitor::new(config.liveness_staleness_window_ms),
            diagnostics: Channel::new(),
        }
    }

    // ── Targets (written by comm) ─────────────────────────────

    pub fn set_heater_target(&self, on: bool) {
        self.heater_target.store(on, Ordering::Release);
    }

    pub fn heater_target(&self) -> bool {
        self.heater_target.load(Ordering::Acquire)
    }

    /// Stored unclamped; the smoker controller clamps.
    pub fn set_smoker_rate_target(&self, rate: i32) {
        self.smoker_rate_target.store(rate, Ordering::Release);
    }

    pub fn smoker_rate_target(&self) -> i32 {
        self.smoker_rate_target.load(Ordering::Acquire)
    }

    // ── Session ───────────────────────────────────────────────

    pub fn session(&self) -> SessionState {
        self.session.lock(Cell::get)
    }

    /// Apply a session command.  Activating also refreshes the keep-alive
    /// and, if the session was inactive, starts a new epoch.
    pub fn set_cooking(&self, active: bool, now: Millis) -> SessionState {
        let (before, after) = self.session.lock(|cell| {
            let before = cell.get();
            let mut s = before;
            if active {
                if !s.cooking_active {
                    s.epoch = s.epoch.wrapping_add(1);
                }
                s.last_keepalive_at = now;
            }
            s.cooking_active = active;
            cell.set(s);
            (before, s)
        });
        // Logged outside the critical section.
        match (before.cooking_active, after.cooking_active) {
            (false, true) => info!("Session: started (epoch {})", after.epoch),
            (true, false) => info!("Session: stopped by host"),
            _ => {}
        }
        after
    }

    /// Clear `cooking_active` once `now - last_keepalive_at > timeout_ms`.
    /// Returns `true` only on the tick the session lapses.
    pub fn expire_session(&self, now: Millis, timeout_ms: Millis) -> bool {
        self.session.lock(|cell| {
            let mut s = cell.get();
            if s.cooking_active && now.saturating_sub(s.last_keepalive_at) > timeout_ms {
                s.cooking_active = false;
                cell.set(s);
                true
            } else {
                false
            }
        })
    }

    // ── Status (written by control) ───────────────────────────

    pub fn publish_status(&self, status: StatusSnapshot) {
        self.status.lock(|cell| cell.set(status));
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.lock(Cell::get)
    }
}
