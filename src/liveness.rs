//! Cross-task liveness monitor.
//!
//! Each task stamps its own slot at the start of every tick and, before
//! refreshing the shared hardware watchdog, checks that its partner has
//! stamped within the staleness window.  A hung partner therefore stops
//! *both* refresh paths and the watchdog resets the chip.
//!
//! Every slot has exactly one writer.  The timestamps are 64-bit, so
//! `portable-atomic` supplies tear-free loads on the Xtensa core, which
//! has no native 64-bit atomics.

use core::fmt;

use portable_atomic::{AtomicU64, Ordering};

use crate::app::ports::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    Control,
    Communication,
}

impl TaskId {
    pub const fn partner(self) -> Self {
        match self {
            Self::Control => Self::Communication,
            Self::Communication => Self::Control,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Communication => "comm",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct LivenessMonitor {
    control_last_tick: AtomicU64,
    comm_last_tick: AtomicU64,
    window_ms: Millis,
}

impl LivenessMonitor {
    /// Both tasks count as alive at boot (t = 0).
    pub const fn new(window_ms: Millis) -> Self {
        Self {
            control_last_tick: AtomicU64::new(0),
            comm_last_tick: AtomicU64::new(0),
            window_ms,
        }
    }

    fn slot(&self, task: TaskId) -> &AtomicU64 {
        match task {
            TaskId::Control => &self.control_last_tick,
            TaskId::Communication => &self.comm_last_tick,
        }
    }

    /// Stamp `task` as alive.  Only `task` itself may call this.
    pub fn record_tick(&self, task: TaskId, now: Millis) {
        self.slot(task).store(now, Ordering::Release);
    }

    pub fn last_tick(&self, task: TaskId) -> Millis {
        self.slot(task).load(Ordering::Acquire)
    }

    /// Whether `task` may refresh the watchdog: its partner must have
    /// ticked no more than the staleness window ago.
    pub fn may_refresh(&self, task: TaskId, now: Millis) -> bool {
        let partner = self.last_tick(task.partner());
        now.saturating_sub(partner) <= self.window_ms
    }

    pub fn window_ms(&self) -> Millis {
        self.window_ms
    }
}
