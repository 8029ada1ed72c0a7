//! Communication task: host commands in, telemetry and diagnostics out.
//!
//! Every step is non-blocking.  A link error is logged and the rest of
//! the tick still runs, so a broken link never stops the liveness stamp
//! or the watchdog refresh.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::{Clock, EventSink, Millis, WatchdogPort};
use crate::config::SmokerConfig;
use crate::error::CommsError;
use crate::host::diag::write_diagnostic;
use crate::host::handler::CommandHandler;
use crate::host::telemetry::{PublishOutcome, TelemetryPublisher};
use crate::host::transport::Transport;
use crate::liveness::TaskId;
use crate::shared::SharedState;

use super::{WatchdogGate, remaining_delay};

/// Diagnostic lines written per tick at most.
const MAX_DIAG_PER_TICK: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommTick {
    pub lines: usize,
    pub telemetry: Option<PublishOutcome>,
    pub diagnostics: usize,
    pub buffers_cleared: bool,
    pub link_errors: u32,
}

pub struct CommTask<T, W, S> {
    transport: T,
    watchdog: W,
    sink: S,
    shared: Arc<SharedState>,
    handler: CommandHandler,
    publisher: TelemetryPublisher,
    gate: WatchdogGate,
    tick_ms: Millis,
}

impl<T, W, S> CommTask<T, W, S>
where
    T: Transport,
    W: WatchdogPort,
    S: EventSink,
{
    pub fn new(
        config: &SmokerConfig,
        transport: T,
        watchdog: W,
        sink: S,
        shared: Arc<SharedState>,
    ) -> Self {
        Self {
            transport,
            watchdog,
            sink,
            shared,
            handler: CommandHandler::new(),
            publisher: TelemetryPublisher::new(config),
            gate: WatchdogGate::new(TaskId::Communication),
            tick_ms: config.comm_tick_ms,
        }
    }

    /// Write a one-off diagnostic line, e.g. the boot configuration.
    pub fn announce(&mut self, text: &dyn core::fmt::Display) {
        match write_diagnostic(&mut self.transport, text) {
            Ok(true) => {}
            Ok(false) => warn!("Comm: announcement dropped"),
            Err(e) => warn!("Comm: announcement failed: {e}"),
        }
    }

    pub fn step(&mut self, now: Millis) -> CommTick {
        self.shared.liveness.record_tick(TaskId::Communication, now);
        let may_refresh = self.shared.liveness.may_refresh(TaskId::Communication, now);
        let mut tick = CommTick::default();

        match self.handler.poll(now, &mut self.transport, &self.shared) {
            Ok(n) => tick.lines = n,
            Err(e) => link_error(&mut tick, "read", e),
        }

        match self.publisher.poll(now, &self.shared, &mut self.transport) {
            Ok(PublishOutcome::NotDue) => {}
            Ok(outcome) => tick.telemetry = Some(outcome),
            Err(e) => link_error(&mut tick, "telemetry", e),
        }

        for _ in 0..MAX_DIAG_PER_TICK {
            let Ok(event) = self.shared.diagnostics.try_receive() else {
                break;
            };
            match write_diagnostic(&mut self.transport, &event) {
                Ok(true) => tick.diagnostics += 1,
                Ok(false) => {}
                Err(e) => {
                    link_error(&mut tick, "diagnostic", e);
                    break;
                }
            }
        }

        if self.publisher.flush_due(now) {
            match self.transport.clear() {
                Ok(()) => {
                    self.handler.reset();
                    tick.buffers_cleared = true;
                }
                Err(e) => link_error(&mut tick, "clear", e),
            }
        }

        if let Err(e) = self.transport.flush() {
            link_error(&mut tick, "flush", e);
        }

        self.gate.refresh(may_refresh, &self.watchdog, &mut self.sink);
        tick
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    pub fn gate(&self) -> &WatchdogGate {
        &self.gate
    }

    /// One tick stamped from `clock`.  Returns the delay left in the period.
    pub fn run_once(&mut self, clock: &impl Clock) -> (CommTick, Duration) {
        let started = clock.now_ms();
        let tick = self.step(started);
        (tick, remaining_delay(self.tick_ms, started, clock.now_ms()))
    }

    pub fn run(mut self, clock: &impl Clock) -> ! {
        info!("Comm task running every {} ms", self.tick_ms);
        loop {
            let (_, delay) = self.run_once(clock);
            std::thread::sleep(delay);
        }
    }
}

fn link_error(tick: &mut CommTick, what: &str, e: CommsError) {
    tick.link_errors += 1;
    warn!("Comm: {what} failed: {e}");
}
