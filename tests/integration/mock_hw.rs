//! Mock adapters for integration tests.
//!
//! Probes, relays, watchdog, event sink and clock all hand out shared
//! handles, so a test can keep poking at them after they have been moved
//! into a task.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use smokehouse::app::events::AppEvent;
use smokehouse::app::ports::{
    ActuatorPort, Clock, EventSink, Millis, ThermocouplePort, WatchdogPort,
};
use smokehouse::app::service::ControlService;
use smokehouse::config::SmokerConfig;
use smokehouse::error::CommsError;
use smokehouse::host::transport::Transport;
use smokehouse::sensors::SensorHub;
use smokehouse::sensors::channel::{FaultCode, FaultKind};
use smokehouse::shared::SharedState;
use smokehouse::tasks::comm::CommTask;
use smokehouse::tasks::control::ControlTask;

// ── Probe ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    Reading(i32),
    Pending,
    Fault(FaultCode),
}

/// A probe whose behaviour is set through a shared handle.
#[derive(Clone)]
pub struct MockProbe(Rc<Cell<ProbeMode>>);

#[allow(dead_code)]
impl MockProbe {
    pub fn reading(value: i32) -> Self {
        Self(Rc::new(Cell::new(ProbeMode::Reading(value))))
    }

    pub fn set(&self, value: i32) {
        self.0.set(ProbeMode::Reading(value));
    }

    pub fn pending(&self) {
        self.0.set(ProbeMode::Pending);
    }

    pub fn open_circuit(&self) {
        self.0.set(ProbeMode::Fault(FaultKind::OpenCircuit.into()));
    }
}

impl ThermocouplePort for MockProbe {
    fn sample(&mut self) -> Result<Option<i32>, FaultCode> {
        match self.0.get() {
            ProbeMode::Reading(v) => Ok(Some(v)),
            ProbeMode::Pending => Ok(None),
            ProbeMode::Fault(code) => Err(code),
        }
    }
}

// ── Relays ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RelayLog {
    pub heater: bool,
    pub fan: bool,
    pub smoker: bool,
    pub writes: u32,
}

#[derive(Clone, Default)]
pub struct MockRelays(pub Rc<RefCell<RelayLog>>);

#[allow(dead_code)]
impl MockRelays {
    pub fn heater(&self) -> bool {
        self.0.borrow().heater
    }

    pub fn fan(&self) -> bool {
        self.0.borrow().fan
    }

    pub fn smoker(&self) -> bool {
        self.0.borrow().smoker
    }

    pub fn all_off(&self) -> bool {
        let log = self.0.borrow();
        !(log.heater || log.fan || log.smoker)
    }
}

impl ActuatorPort for MockRelays {
    fn set_heater(&mut self, on: bool) {
        let mut log = self.0.borrow_mut();
        log.heater = on;
        log.writes += 1;
    }

    fn set_fan(&mut self, on: bool) {
        let mut log = self.0.borrow_mut();
        log.fan = on;
        log.writes += 1;
    }

    fn set_smoker(&mut self, on: bool) {
        let mut log = self.0.borrow_mut();
        log.smoker = on;
        log.writes += 1;
    }
}

// ── Watchdog ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockWatchdog(Rc<Cell<u32>>);

impl MockWatchdog {
    pub fn feeds(&self) -> u32 {
        self.0.get()
    }
}

impl WatchdogPort for MockWatchdog {
    fn feed(&self) {
        self.0.set(self.0.get() + 1);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(pub Rc<RefCell<Vec<AppEvent>>>);

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.0.borrow().clone()
    }

    pub fn count(&self, event: &AppEvent) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.borrow_mut().push(*event);
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock(Cell<Millis>);

impl ManualClock {
    pub fn at(t: Millis) -> Self {
        Self(Cell::new(t))
    }

    pub fn advance(&self, ms: Millis) -> Millis {
        self.0.set(self.0.get() + ms);
        self.0.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.0.get()
    }
}

// ── Transport ─────────────────────────────────────────────────

/// In-memory host link: the test plays the host side.
pub struct LoopbackTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    tx_capacity: usize,
    pub clears: u32,
}

#[allow(dead_code)]
impl LoopbackTransport {
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    pub fn with_capacity(tx_capacity: usize) -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            tx_capacity,
            clears: 0,
        }
    }

    /// Host → device.
    pub fn send(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Device → host: drain everything written so far, split into lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        let out = String::from_utf8_lossy(&self.tx).into_owned();
        self.tx.clear();
        out.lines().map(str::to_owned).collect()
    }

    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }
}

impl Transport for LoopbackTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CommsError> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, CommsError> {
        let n = data.len().min(self.writable());
        self.tx.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    fn writable(&self) -> usize {
        self.tx_capacity - self.tx.len()
    }

    fn clear(&mut self) -> Result<(), CommsError> {
        self.rx.clear();
        self.tx.clear();
        self.clears += 1;
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestControlTask = ControlTask<MockProbe, MockRelays, MockWatchdog, RecordingSink>;
pub type TestCommTask = CommTask<LoopbackTransport, MockWatchdog, RecordingSink>;

/// Both tasks wired to one shared state and one watchdog.
#[allow(dead_code)]
pub struct Rig {
    pub shared: Arc<SharedState>,
    pub control: TestControlTask,
    pub comm: TestCommTask,
    pub top: MockProbe,
    pub bottom: MockProbe,
    pub meat: MockProbe,
    pub relays: MockRelays,
    pub watchdog: MockWatchdog,
    pub events: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SmokerConfig) -> Self {
        let shared = Arc::new(SharedState::new(&config));
        let (top, bottom, meat) = (
            MockProbe::reading(220),
            MockProbe::reading(225),
            MockProbe::reading(140),
        );
        let hub = SensorHub::new(top.clone(), bottom.clone(), meat.clone(), [0, 0, 0]);
        let relays = MockRelays::default();
        let watchdog = MockWatchdog::default();
        let events = RecordingSink::default();

        let service = ControlService::new(&config, hub, Arc::clone(&shared));
        let control = ControlTask::new(
            &config,
            service,
            relays.clone(),
            watchdog.clone(),
            events.clone(),
            Arc::clone(&shared),
        );
        let comm = CommTask::new(
            &config,
            LoopbackTransport::new(),
            watchdog.clone(),
            events.clone(),
            Arc::clone(&shared),
        );

        Self {
            shared,
            control,
            comm,
            top,
            bottom,
            meat,
            relays,
            watchdog,
            events,
        }
    }

    /// Host sends `line` (terminator added).
    pub fn host_sends(&mut self, line: &str) {
        let t = self.comm.transport_mut();
        t.send(line.as_bytes());
        t.send(b"\n");
    }

    /// Run both tasks once at `now`, comm first so commands land this tick.
    pub fn tick_both(&mut self, now: Millis) {
        self.comm.step(now);
        self.control.step(now);
    }

    /// Start a session and enable every output.
    pub fn start_cooking(&mut self, now: Millis) {
        self.host_sends("COOKING_STATE 1");
        self.host_sends("HEATER_STATE 1");
        self.host_sends("SMOKER_RATE 100");
        self.tick_both(now);
    }
}
