//! Control task: one [`ControlService::tick`] per `control_tick_ms`.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::app::ports::{ActuatorPort, Clock, EventSink, Millis, ThermocouplePort, WatchdogPort};
use crate::app::service::ControlService;
use crate::config::SmokerConfig;
use crate::liveness::TaskId;
use crate::safety::SafetyVerdict;
use crate::shared::SharedState;

use super::{WatchdogGate, remaining_delay};

pub struct ControlTask<P, A, W, S> {
    service: ControlService<P>,
    actuators: A,
    watchdog: W,
    sink: S,
    shared: Arc<SharedState>,
    gate: WatchdogGate,
    tick_ms: Millis,
}

impl<P, A, W, S> ControlTask<P, A, W, S>
where
    P: ThermocouplePort,
    A: ActuatorPort,
    W: WatchdogPort,
    S: EventSink,
{
    pub fn new(
        config: &SmokerConfig,
        service: ControlService<P>,
        actuators: A,
        watchdog: W,
        sink: S,
        shared: Arc<SharedState>,
    ) -> Self {
        Self {
            service,
            actuators,
            watchdog,
            sink,
            shared,
            gate: WatchdogGate::new(TaskId::Control),
            tick_ms: config.control_tick_ms,
        }
    }

    /// All relays off, `Started` emitted.
    pub fn start(&mut self, now: Millis) {
        self.shared.liveness.record_tick(TaskId::Control, now);
        self.service.start(&mut self.actuators, &mut self.sink);
    }

    /// One tick.  The partner check happens before the control work so a
    /// long tick cannot mask a stall that was already visible.
    pub fn step(&mut self, now: Millis) -> SafetyVerdict {
        self.shared.liveness.record_tick(TaskId::Control, now);
        let may_refresh = self.shared.liveness.may_refresh(TaskId::Control, now);

        let verdict = self.service.tick(now, &mut self.actuators, &mut self.sink);

        self.gate.refresh(may_refresh, &self.watchdog, &mut self.sink);
        verdict
    }

    pub fn service(&self) -> &ControlService<P> {
        &self.service
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn gate(&self) -> &WatchdogGate {
        &self.gate
    }

    /// One tick stamped from `clock`.  Returns the delay left in the period.
    pub fn run_once(&mut self, clock: &impl Clock) -> Duration {
        let started = clock.now_ms();
        self.step(started);
        remaining_delay(self.tick_ms, started, clock.now_ms())
    }

    /// Run forever at the configured period.
    pub fn run(mut self, clock: &impl Clock) -> ! {
        self.start(clock.now_ms());
        info!("Control task running every {} ms", self.tick_ms);
        loop {
            let delay = self.run_once(clock);
            std::thread::sleep(delay);
        }
    }
}
