//! The two periodic tasks and the watchdog gate they share.
//!
//! ```text
//!   Core 1 (APP)  ControlTask  acquire · supervise · drive relays
//!   Core 0 (PRO)  CommTask     commands in · telemetry / diag out
//!                     │                     │
//!                     └─── LivenessMonitor ─┘──▶ WatchdogPort
//! ```
//!
//! Each task stamps its liveness slot at the start of a tick and only
//! refreshes the watchdog when its partner is fresh.

pub mod comm;
pub mod control;

use std::time::Duration;

use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, Millis, WatchdogPort};
use crate::liveness::TaskId;

/// Delay that completes a `tick_ms` period begun at `started`.  An
/// overrunning tick gets no delay.
pub fn remaining_delay(tick_ms: Millis, started: Millis, now: Millis) -> Duration {
    let spent = now.saturating_sub(started);
    Duration::from_millis(tick_ms.saturating_sub(spent))
}

/// Feeds the watchdog on behalf of one task and reports edges of the
/// refresh decision.
pub struct WatchdogGate {
    task: TaskId,
    withheld: bool,
}

impl WatchdogGate {
    pub const fn new(task: TaskId) -> Self {
        Self {
            task,
            withheld: false,
        }
    }

    /// Feed `watchdog` if `may_refresh`.  Returns whether it was fed.
    pub fn refresh(
        &mut self,
        may_refresh: bool,
        watchdog: &impl WatchdogPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if may_refresh {
            watchdog.feed();
            if self.withheld {
                self.withheld = false;
                info!("Watchdog: {} task resumed refreshing", self.task);
                sink.emit(&AppEvent::WatchdogResumed { by: self.task });
            }
        } else if !self.withheld {
            self.withheld = true;
            error!(
                "Watchdog: {} task stale, {} task withholding refresh",
                self.task.partner(),
                self.task
            );
            sink.emit(&AppEvent::WatchdogWithheld { by: self.task });
        }
        may_refresh
    }

    pub fn is_withheld(&self) -> bool {
        self.withheld
    }
}
