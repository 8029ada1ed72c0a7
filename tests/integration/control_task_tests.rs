//! Control task behaviour against mock probes and relays.

use smokehouse::app::events::AppEvent;
use smokehouse::config::{OverTempPolicy, SmokerConfig};
use smokehouse::control::Actuator;
use smokehouse::safety::VerdictReason;
use smokehouse::sensors::channel::{ChannelId, FaultKind, FaultReport};

use crate::mock_hw::Rig;

fn rig() -> Rig {
    Rig::new(SmokerConfig::default())
}

// ── Fail-safe dominance ───────────────────────────────────────

#[test]
fn overtemp_forces_every_output_off_within_one_tick() {
    let mut rig = rig();
    rig.start_cooking(0);
    assert!(rig.relays.heater());
    assert!(rig.relays.smoker());

    rig.top.set(350);
    let v = rig.control.step(100);
    assert_eq!(v.reason, VerdictReason::OverTemp);
    assert!(rig.relays.all_off());

    rig.top.set(220);
    let v = rig.control.step(200);
    assert!(v.control_permitted, "auto-recover resumes on the next clean tick");
    assert!(rig.relays.heater());
}

#[test]
fn meat_overtemp_also_trips() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.meat.set(301);
    assert_eq!(rig.control.step(100).reason, VerdictReason::OverTemp);
    assert!(rig.relays.all_off());
}

#[test]
fn required_probe_fault_forbids_control() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.bottom.open_circuit();
    assert_eq!(rig.control.step(100).reason, VerdictReason::SensorInvalid);
    assert!(rig.relays.all_off());
}

#[test]
fn meat_probe_fault_is_reported_but_advisory() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.events.clear();
    rig.meat.open_circuit();
    for t in [100, 200, 300] {
        assert!(rig.control.step(t).control_permitted);
    }
    let fault = AppEvent::SensorFault(FaultReport {
        channel: ChannelId::Meat,
        code: FaultKind::OpenCircuit.into(),
    });
    assert_eq!(rig.events.count(&fault), 1, "fault reported on the edge only");

    rig.meat.set(150);
    rig.control.step(400);
    assert_eq!(rig.events.count(&AppEvent::SensorRecovered(ChannelId::Meat)), 1);
}

#[test]
fn stuck_meat_channel_ages_out_but_stays_advisory() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.events.clear();
    rig.meat.pending();

    for t in (100..=5_000).step_by(100) {
        rig.tick_both(t);
    }
    assert!(rig.shared.status().readings[ChannelId::Meat.index()].valid);

    for t in [5_001, 5_100, 5_200] {
        rig.tick_both(t);
        assert!(rig.control.service().verdict().control_permitted);
        assert!(rig.relays.heater());
    }
    let meat = rig.shared.status().readings[ChannelId::Meat.index()];
    assert!(!meat.valid);
    assert_eq!(meat.last_valid_at, Some(0));
    let stale = AppEvent::SensorFault(FaultReport {
        channel: ChannelId::Meat,
        code: FaultKind::Stale.into(),
    });
    assert_eq!(rig.events.count(&stale), 1);

    rig.meat.set(150);
    rig.tick_both(5_300);
    assert!(rig.shared.status().readings[ChannelId::Meat.index()].valid);
    assert_eq!(rig.events.count(&AppEvent::SensorRecovered(ChannelId::Meat)), 1);
}

#[test]
fn stale_meat_reading_no_longer_trips_over_temp() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.meat.set(310);
    assert_eq!(rig.control.step(100).reason, VerdictReason::OverTemp);

    // Last good meat sample at 100; the frozen 310 stops counting after 5000.
    rig.meat.pending();
    assert_eq!(rig.control.step(5_100).reason, VerdictReason::OverTemp);
    assert_eq!(rig.control.step(5_200).reason, VerdictReason::None);
    assert!(rig.relays.heater());
}

// ── Session gating ────────────────────────────────────────────

#[test]
fn targets_without_session_leave_outputs_off() {
    let mut rig = rig();
    rig.host_sends("HEATER_STATE 1");
    rig.host_sends("SMOKER_RATE 100");
    rig.tick_both(0);
    assert!(rig.shared.heater_target());
    assert_eq!(rig.control.service().verdict().reason, VerdictReason::SessionExpired);
    assert!(rig.relays.all_off());
}

#[test]
fn session_lapses_strictly_after_timeout() {
    let mut rig = rig();
    rig.start_cooking(1_000);

    rig.tick_both(31_000);
    assert!(rig.shared.session().cooking_active);
    assert!(rig.relays.heater());

    rig.tick_both(31_001);
    assert!(!rig.shared.session().cooking_active);
    assert!(rig.relays.all_off());
    assert_eq!(rig.events.count(&AppEvent::SessionExpired), 1);
}

#[test]
fn keepalive_holds_the_session_open() {
    let mut rig = rig();
    rig.start_cooking(0);
    for t in (10_000..=90_000).step_by(10_000) {
        rig.host_sends("COOKING_STATE 1");
        rig.tick_both(t);
    }
    assert!(rig.relays.heater());
    assert_eq!(rig.events.count(&AppEvent::SessionExpired), 0);
}

#[test]
fn cooking_stop_turns_everything_off() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.host_sends("COOKING_STATE 0");
    rig.tick_both(100);
    assert!(rig.relays.all_off());
}

// ── Staleness ─────────────────────────────────────────────────

#[test]
fn stuck_conversion_escalates_to_stale() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.top.pending();

    for t in (100..=5_000).step_by(100) {
        rig.host_sends("COOKING_STATE 1");
        rig.tick_both(t);
    }
    assert!(rig.control.service().verdict().control_permitted);

    rig.tick_both(5_001);
    assert_eq!(rig.control.service().verdict().reason, VerdictReason::SensorStale);
    assert!(rig.relays.all_off());
}

// ── Fan ───────────────────────────────────────────────────────

#[test]
fn fan_follows_the_hysteresis_band() {
    let mut rig = rig();
    rig.start_cooking(0);
    assert!(!rig.relays.fan());

    rig.top.set(260); // spread 35
    rig.control.step(100);
    assert!(rig.relays.fan());

    rig.top.set(245); // spread 20, inside the band
    rig.control.step(200);
    assert!(rig.relays.fan());

    rig.top.set(235); // spread 10
    rig.control.step(300);
    assert!(!rig.relays.fan());

    let on = AppEvent::ActuatorChanged {
        actuator: Actuator::Fan,
        on: true,
    };
    assert_eq!(rig.events.count(&on), 1);
}

#[test]
fn spread_is_symmetric() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.bottom.set(260);
    rig.top.set(225);
    rig.control.step(100);
    assert!(rig.relays.fan());
}

// ── Smoker duty cycle ─────────────────────────────────────────

#[test]
fn half_duty_is_on_for_first_half_of_each_window() {
    let config = SmokerConfig {
        smoker_cycle_length_ms: 1_000,
        ..SmokerConfig::default()
    };
    let mut rig = Rig::new(config);
    rig.host_sends("COOKING_STATE 1");
    rig.host_sends("SMOKER_RATE 50");
    rig.comm.step(0);

    for t in (0..5_000).step_by(100) {
        rig.control.step(t);
        assert_eq!(rig.relays.smoker(), t % 1_000 < 500, "t = {t}");
    }
}

#[test]
fn out_of_range_rates_are_clamped() {
    let mut rig = rig();
    rig.host_sends("COOKING_STATE 1");
    rig.host_sends("SMOKER_RATE 250");
    rig.tick_both(0);
    assert!(rig.relays.smoker());
    assert_eq!(rig.control.service().outputs().smoker.duty_rate, 100);

    rig.host_sends("SMOKER_RATE -5");
    rig.tick_both(100);
    assert!(!rig.relays.smoker());
    assert_eq!(rig.control.service().outputs().smoker.duty_rate, 0);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn repeated_heater_command_is_idempotent() {
    let mut once = rig();
    once.host_sends("COOKING_STATE 1");
    once.host_sends("HEATER_STATE 1");
    once.tick_both(0);

    let mut twice = rig();
    twice.host_sends("COOKING_STATE 1");
    twice.host_sends("HEATER_STATE 1");
    twice.host_sends("HEATER_STATE 1");
    twice.tick_both(0);

    assert_eq!(once.relays.heater(), twice.relays.heater());
    assert_eq!(once.shared.heater_target(), twice.shared.heater_target());
    assert_eq!(once.events.events(), twice.events.events());
}

// ── Latched over-temperature ──────────────────────────────────

#[test]
fn latched_trip_holds_until_session_restart() {
    let config = SmokerConfig {
        overtemp_policy: OverTempPolicy::Latched,
        ..SmokerConfig::default()
    };
    let mut rig = Rig::new(config);
    rig.start_cooking(0);
    assert!(rig.relays.heater());

    rig.top.set(320);
    rig.tick_both(100);
    rig.top.set(220);
    rig.tick_both(200);
    assert_eq!(rig.control.service().verdict().reason, VerdictReason::OverTemp);

    // A keep-alive within the same session does not release the latch.
    rig.host_sends("COOKING_STATE 1");
    rig.tick_both(300);
    assert_eq!(rig.control.service().verdict().reason, VerdictReason::OverTemp);
    assert!(rig.relays.all_off());

    rig.host_sends("COOKING_STATE 0");
    rig.tick_both(400);
    rig.host_sends("COOKING_STATE 1");
    rig.tick_both(500);
    assert!(rig.control.service().verdict().control_permitted);
    assert!(rig.relays.heater());
}
