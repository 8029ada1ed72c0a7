//! Cross-task liveness: a stalled task must stop both watchdog refreshes.

use std::time::Duration;

use smokehouse::app::events::AppEvent;
use smokehouse::config::SmokerConfig;
use smokehouse::host::telemetry::PublishOutcome;
use smokehouse::liveness::TaskId;

use crate::mock_hw::{ManualClock, Rig};

fn rig() -> Rig {
    Rig::new(SmokerConfig::default())
}

#[test]
fn healthy_tasks_both_refresh() {
    let mut rig = rig();
    for t in (0..1_000).step_by(100) {
        rig.tick_both(t);
    }
    assert_eq!(rig.watchdog.feeds(), 20);
    assert!(!rig.control.gate().is_withheld());
    assert!(!rig.comm.gate().is_withheld());
}

#[test]
fn stalled_comm_task_makes_control_withhold() {
    let mut rig = rig();
    rig.tick_both(1_000);

    // Comm stops; the window is 2000 ms.
    for t in (1_100..=3_000).step_by(100) {
        rig.control.step(t);
    }
    assert!(!rig.control.gate().is_withheld());
    let fed = rig.watchdog.feeds();

    for t in (3_100..=6_000).step_by(100) {
        rig.control.step(t);
    }
    assert_eq!(rig.watchdog.feeds(), fed, "no refresh while the partner is stale");
    assert!(rig.control.gate().is_withheld());
    assert_eq!(
        rig.events.count(&AppEvent::WatchdogWithheld { by: TaskId::Control }),
        1
    );
}

#[test]
fn control_resumes_when_comm_recovers() {
    let mut rig = rig();
    rig.tick_both(0);
    rig.control.step(2_500);
    assert!(rig.control.gate().is_withheld());

    rig.tick_both(2_600);
    assert!(!rig.control.gate().is_withheld());
    assert_eq!(
        rig.events.count(&AppEvent::WatchdogResumed { by: TaskId::Control }),
        1
    );
}

#[test]
fn stalled_control_task_makes_comm_withhold() {
    let mut rig = rig();
    rig.tick_both(0);
    for t in (20..=2_000).step_by(20) {
        rig.comm.step(t);
    }
    assert!(!rig.comm.gate().is_withheld());
    rig.comm.step(2_020);
    assert!(rig.comm.gate().is_withheld());
    assert_eq!(
        rig.events.count(&AppEvent::WatchdogWithheld { by: TaskId::Communication }),
        1
    );
}

#[test]
fn withheld_refresh_still_runs_the_control_tick() {
    let mut rig = rig();
    rig.start_cooking(0);
    rig.top.set(400);
    rig.control.step(5_000);
    assert!(rig.control.gate().is_withheld());
    assert!(rig.relays.all_off(), "safety still acts while the reset is pending");
}

#[test]
fn clocked_ticks_stamp_liveness_and_return_the_period() {
    let mut rig = rig();
    let clock = ManualClock::at(1_000);

    assert_eq!(rig.control.run_once(&clock), Duration::from_millis(100));
    assert_eq!(rig.shared.liveness.last_tick(TaskId::Control), 1_000);

    clock.advance(20);
    let (tick, delay) = rig.comm.run_once(&clock);
    assert_eq!(delay, Duration::from_millis(20));
    assert_eq!(tick.telemetry, Some(PublishOutcome::Sent));
    assert_eq!(rig.shared.liveness.last_tick(TaskId::Communication), 1_020);
    assert_eq!(rig.watchdog.feeds(), 2);
}
