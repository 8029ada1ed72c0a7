//! Communication task: command intake, telemetry, diagnostics and buffer
//! hygiene over the loopback transport.

use std::sync::Arc;

use smokehouse::adapters::log_sink::LinkEventSink;
use smokehouse::app::events::AppEvent;
use smokehouse::app::ports::EventSink;
use smokehouse::config::SmokerConfig;
use smokehouse::host::telemetry::{OnOff, PublishOutcome, TelemetryRecord};
use smokehouse::liveness::TaskId;
use smokehouse::sensors::channel::MAX_REPORTED_TEMP;
use smokehouse::safety::VerdictReason;
use smokehouse::shared::SharedState;
use smokehouse::tasks::comm::CommTask;

use crate::mock_hw::{LoopbackTransport, MockWatchdog, RecordingSink, Rig};

fn telemetry(lines: &[String]) -> Vec<TelemetryRecord> {
    lines
        .iter()
        .filter(|l| l.starts_with('{'))
        .map(|l| TelemetryRecord::decode(l.as_bytes()).unwrap())
        .collect()
}

#[test]
fn telemetry_reflects_the_last_control_tick() {
    let mut rig = Rig::new(SmokerConfig::default());
    rig.start_cooking(0);
    rig.comm.transport_mut().take_lines();

    rig.control.step(1_000);
    rig.comm.step(1_000);
    let lines = rig.comm.transport_mut().take_lines();
    let records = telemetry(&lines);
    assert_eq!(records.len(), 1);

    let rec = &records[0];
    assert_eq!(rec.timestamp, 1_000);
    assert_eq!(
        (rec.temp_air_top, rec.temp_air_bottom, rec.temp_meat),
        (220, 225, 140)
    );
    assert_eq!(rec.cooking_state, OnOff::On);
    assert_eq!(rec.heater_state, OnOff::On);
    assert_eq!(rec.fan_state, OnOff::Off);
    assert_eq!(rec.smoker_state, OnOff::On);
    assert_eq!(rec.smoker_rate, 100);
    assert_eq!(rec.safety, VerdictReason::None);
}

#[test]
fn telemetry_round_trips_exactly() {
    let mut rig = Rig::new(SmokerConfig::default());
    rig.start_cooking(0);
    rig.control.step(1_000);
    rig.comm.step(1_000);
    let lines = rig.comm.transport_mut().take_lines();
    let line = lines.iter().rev().find(|l| l.starts_with('{')).unwrap();

    let rec = TelemetryRecord::decode(line.as_bytes()).unwrap();
    let again = rec.encode().unwrap();
    assert_eq!(again.strip_suffix(b"\n").unwrap(), line.as_bytes());
}

#[test]
fn faulted_channels_are_reported_as_disconnected() {
    let mut rig = Rig::new(SmokerConfig::default());
    rig.start_cooking(0);
    rig.comm.transport_mut().take_lines();

    rig.top.open_circuit();
    rig.meat.open_circuit();
    rig.control.step(1_000);
    rig.comm.step(1_000);
    let lines = rig.comm.transport_mut().take_lines();
    let records = telemetry(&lines);
    assert_eq!(records.len(), 1);

    let rec = &records[0];
    assert_eq!(
        (rec.temp_air_top, rec.temp_air_bottom, rec.temp_meat),
        (MAX_REPORTED_TEMP, 225, MAX_REPORTED_TEMP)
    );
    assert_eq!(rec.safety, VerdictReason::SensorInvalid);
    assert_eq!(rec.heater_state, OnOff::Off);

    let line = lines.iter().find(|l| l.starts_with('{')).unwrap();
    let again = rec.encode().unwrap();
    assert_eq!(again.strip_suffix(b"\n").unwrap(), line.as_bytes());
}

#[test]
fn telemetry_is_paced_by_interval() {
    let mut rig = Rig::new(SmokerConfig::default());
    let mut sent = 0;
    for t in (0..=3_000).step_by(20) {
        if rig.comm.step(t).telemetry == Some(PublishOutcome::Sent) {
            sent += 1;
        }
    }
    // t = 0, 1000, 2000, 3000
    assert_eq!(sent, 4);
}

#[test]
fn full_output_buffer_drops_the_record() {
    let config = SmokerConfig::default();
    let shared = Arc::new(SharedState::new(&config));
    let mut comm = CommTask::new(
        &config,
        LoopbackTransport::with_capacity(16),
        MockWatchdog::default(),
        RecordingSink::default(),
        Arc::clone(&shared),
    );
    let tick = comm.step(0);
    assert_eq!(tick.telemetry, Some(PublishOutcome::Dropped));
    assert_eq!(tick.link_errors, 0);
    assert!(comm.transport_mut().take_lines().is_empty());
}

#[test]
fn queued_events_become_diagnostic_lines() {
    let mut rig = Rig::new(SmokerConfig::default());
    let mut link = LinkEventSink::new(Arc::clone(&rig.shared));
    link.emit(&AppEvent::SessionExpired);
    link.emit(&AppEvent::WatchdogWithheld { by: TaskId::Control });

    let tick = rig.comm.step(0);
    assert_eq!(tick.diagnostics, 2);
    let lines = rig.comm.transport_mut().take_lines();
    assert!(lines.contains(&"# session expired".to_owned()));
    assert!(lines.contains(&"# watchdog withheld by control: comm task stalled".to_owned()));
}

#[test]
fn protocol_errors_are_never_acknowledged() {
    let mut rig = Rig::new(SmokerConfig::default());
    rig.host_sends("SMOKER_RATE abc");
    rig.host_sends("FAN_STATE 1");
    rig.host_sends("HEATER_STATE yes");
    rig.comm.step(0);

    let lines = rig.comm.transport_mut().take_lines();
    assert!(lines.iter().all(|l| l.starts_with('{')), "{lines:?}");
    let stats = rig.comm.handler().stats();
    assert_eq!((stats.malformed, stats.unknown, stats.applied), (2, 1, 0));
    assert_eq!(rig.shared.smoker_rate_target(), 0);
    assert!(!rig.shared.heater_target());
}

#[test]
fn crlf_terminated_commands_are_accepted() {
    let mut rig = Rig::new(SmokerConfig::default());
    rig.comm.transport_mut().send(b"HEATER_STATE 1\r\nSMOKER_RATE 20\r\n");
    assert_eq!(rig.comm.step(0).lines, 2);
    assert!(rig.shared.heater_target());
    assert_eq!(rig.shared.smoker_rate_target(), 20);
}

#[test]
fn hygiene_period_clears_buffers_and_partial_line() {
    let config = SmokerConfig {
        buffer_flush_interval_ms: 10_000,
        ..SmokerConfig::default()
    };
    let mut rig = Rig::new(config);
    rig.comm.transport_mut().send(b"HEATER_STA");
    assert!(!rig.comm.step(9_980).buffers_cleared);

    assert!(rig.comm.step(10_000).buffers_cleared);
    assert_eq!(rig.comm.transport().clears, 1);
    assert!(
        rig.comm.transport_mut().take_lines().is_empty(),
        "output queued before the clear is gone"
    );

    rig.comm.transport_mut().send(b"TE 1\n");
    rig.comm.step(10_020);
    assert!(!rig.shared.heater_target(), "partial line must not survive a clear");
    assert_eq!(rig.comm.handler().stats().unknown, 1);
}
