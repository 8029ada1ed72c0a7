//! Control service — the hexagonal core of the control task.
//!
//! [`ControlService`] owns the sensor hub, the safety supervisor and the
//! three actuator controllers.  All I/O flows through port traits passed
//! in at call sites, making the entire service testable with mock
//! adapters and an injected clock.
//!
//! ```text
//!  ThermocouplePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                       │        ControlService         │
//!     ActuatorPort ◀────│ Sensors · Safety · Fan/Heater │
//!                       │           · Smoker            │
//!                       └──────────────────────────────┘
//!                                ▲            │
//!                      targets,  │            │ status
//!                      session   │            ▼
//!                              SharedState
//! ```

use std::sync::Arc;

use log::{debug, info};

use crate::config::SmokerConfig;
use crate::control::fan::FanController;
use crate::control::heater::HeaterController;
use crate::control::smoker::SmokerController;
use crate::control::{Actuator, ActuatorSnapshot};
use crate::safety::{SafetySupervisor, SafetyVerdict, VerdictReason};
use crate::sensors::SensorHub;
use crate::sensors::channel::{ChannelId, FaultCode, FaultReport};
use crate::shared::{SharedState, StatusSnapshot};

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, Millis, ThermocouplePort};

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

pub struct ControlService<P> {
    hub: SensorHub<P>,
    supervisor: SafetySupervisor,
    fan: FanController,
    heater: HeaterController,
    smoker: SmokerController,
    shared: Arc<SharedState>,
    session_timeout_ms: Millis,
    /// Last verdict, for edge reporting.
    verdict: SafetyVerdict,
    /// Last reported fault set per channel (empty = healthy).
    channel_faults: [FaultCode; ChannelId::COUNT],
    outputs: ActuatorSnapshot,
    tick_count: u64,
}

impl<P: ThermocouplePort> ControlService<P> {
    pub fn new(config: &SmokerConfig, mut hub: SensorHub<P>, shared: Arc<SharedState>) -> Self {
        hub.set_advisory_timeout(config.sensor_timeout_ms);
        Self {
            hub,
            supervisor: SafetySupervisor::new(config),
            fan: FanController::new(config),
            heater: HeaterController::new(config),
            smoker: SmokerController::new(config),
            shared,
            session_timeout_ms: config.session_timeout_ms,
            verdict: SafetyVerdict::forbidden(VerdictReason::SensorInvalid),
            channel_faults: [FaultCode::empty(); ChannelId::COUNT],
            outputs: ActuatorSnapshot::all_off(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every relay off and announce the service.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        sink.emit(&AppEvent::Started);
        info!("ControlService started, all outputs off");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: acquire → supervise → control → apply.
    ///
    /// Acquisition strictly precedes evaluation, which strictly precedes
    /// the actuator updates, so no controller ever acts on a verdict
    /// computed from a previous tick's readings.
    pub fn tick(
        &mut self,
        now: Millis,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> SafetyVerdict {
        self.tick_count += 1;

        // 1. Acquire.  Faults latch for one tick only.
        self.hub.clear_faults();
        let acq = self.hub.acquire_all(now);
        self.report_faults(&acq.faults, sink);

        // 2. Session expiry, then the verdict.
        if self.shared.expire_session(now, self.session_timeout_ms) {
            sink.emit(&AppEvent::SessionExpired);
        }
        let session = self.shared.session();
        let verdict = self.supervisor.evaluate(&acq.readings, &session, now);
        if verdict.reason != self.verdict.reason {
            sink.emit(&AppEvent::VerdictChanged {
                from: self.verdict.reason,
                to: verdict.reason,
            });
        }
        self.verdict = verdict;

        // 3. Controllers.
        let top = acq.reading(ChannelId::Top);
        let bottom = acq.reading(ChannelId::Bottom);
        self.heater.update(&verdict, self.shared.heater_target(), now);
        self.fan.update(&verdict, top, bottom, now);
        self.smoker.update(&verdict, self.shared.smoker_rate_target(), now);

        let outputs = ActuatorSnapshot {
            heater: self.heater.state(),
            fan: self.fan.state(),
            smoker: self.smoker.state(),
        };
        debug_assert!(verdict.control_permitted || !outputs.any_enabled());

        // 4. Apply.  Writing every output every tick keeps the relays in
        //    step with the controllers even after a missed GPIO write.
        if verdict.control_permitted {
            hw.set_heater(outputs.heater.enabled);
            hw.set_fan(outputs.fan.enabled);
            hw.set_smoker(outputs.smoker.output.enabled);
        } else {
            hw.all_off();
        }
        self.report_transitions(&outputs, sink);
        self.outputs = outputs;

        // 5. Publish for telemetry.
        self.shared.publish_status(StatusSnapshot {
            at: now,
            readings: acq.readings,
            actuators: outputs,
            verdict,
        });

        verdict
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn verdict(&self) -> SafetyVerdict {
        self.verdict
    }

    pub fn outputs(&self) -> ActuatorSnapshot {
        self.outputs
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn report_faults(&mut self, faults: &[FaultReport], sink: &mut impl EventSink) {
        for id in ChannelId::ALL {
            let now_code = faults
                .iter()
                .find(|r| r.channel == id)
                .map_or(FaultCode::empty(), |r| r.code);
            let prev = self.channel_faults[id.index()];
            if now_code == prev {
                continue;
            }
            if now_code.is_empty() {
                sink.emit(&AppEvent::SensorRecovered(id));
            } else {
                sink.emit(&AppEvent::SensorFault(FaultReport {
                    channel: id,
                    code: now_code,
                }));
            }
            self.channel_faults[id.index()] = now_code;
        }
    }

    fn report_transitions(&self, outputs: &ActuatorSnapshot, sink: &mut impl EventSink) {
        for actuator in [Actuator::Heater, Actuator::Fan, Actuator::Smoker] {
            let on = outputs.enabled(actuator);
            if on != self.outputs.enabled(actuator) {
                // The smoker duty-cycles every few seconds; only a forced
                // stop goes to the diagnostic stream.
                if actuator == Actuator::Smoker && self.verdict.control_permitted {
                    debug!("smoker {}", if on { "ON" } else { "OFF" });
                    continue;
                }
                sink.emit(&AppEvent::ActuatorChanged { actuator, on });
            }
        }
    }
}
