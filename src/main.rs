//! Smokehouse firmware — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Max31856 ×3      RelayBank       UartTransport   Watchdog     │
//! │  (Thermocouple)   (Actuator)      (Transport)     (TWDT user)  │
//! │  MonotonicClock   LinkEventSink                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐   │
//! │  │ ControlTask   (core 1)   │   │ CommTask      (core 0)   │   │
//! │  │ Sensors · Safety · Relays│   │ Commands · Telemetry     │   │
//! │  └────────────┬─────────────┘   └─────────────┬────────────┘   │
//! │               └──────── SharedState ──────────┘                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::gpio::{AnyIOPin, OutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::config::{Config as SpiConfig, MODE_1};
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use smokehouse::adapters::hardware::RelayBank;
use smokehouse::adapters::log_sink::LinkEventSink;
use smokehouse::adapters::serial::UartTransport;
use smokehouse::adapters::time::MonotonicClock;
use smokehouse::app::ports::Clock;
use smokehouse::app::service::ControlService;
use smokehouse::config::SmokerConfig;
use smokehouse::drivers::relay::Relay;
use smokehouse::drivers::task_pin::{Core, spawn_on_core};
use smokehouse::drivers::watchdog::{WATCHDOG_TIMEOUT_MS, Watchdog};
use smokehouse::sensors::SensorHub;
use smokehouse::sensors::max31856::Max31856;
use smokehouse::shared::SharedState;
use smokehouse::tasks::comm::CommTask;
use smokehouse::tasks::control::ControlTask;

const HOST_BAUD: u32 = 115_200;
const PROBE_SPI_HZ: u32 = 1_000_000;

// The relay board energises on a high level.
const RELAY_ACTIVE_LOW: bool = false;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Smokehouse v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SmokerConfig::default();
    config.validate()?;
    let shared = Arc::new(SharedState::new(&config));
    let watchdog = Arc::new(Watchdog::new(WATCHDOG_TIMEOUT_MS)?);

    let p = Peripherals::take()?;

    // ── 3. Thermocouples (SPI2, one CS per probe) ─────────────
    let spi = Arc::new(SpiDriver::new(
        p.spi2,
        p.pins.gpio12,
        p.pins.gpio11,
        Some(p.pins.gpio13),
        &SpiDriverConfig::new(),
    )?);
    let spi_config = SpiConfig::new()
        .baudrate(Hertz(PROBE_SPI_HZ))
        .data_mode(MODE_1);

    let mut probes = [
        Max31856::new(SpiDeviceDriver::new(Arc::clone(&spi), Some(p.pins.gpio10), &spi_config)?),
        Max31856::new(SpiDeviceDriver::new(Arc::clone(&spi), Some(p.pins.gpio9), &spi_config)?),
        Max31856::new(SpiDeviceDriver::new(Arc::clone(&spi), Some(p.pins.gpio8), &spi_config)?),
    ];
    for (probe, name) in probes.iter_mut().zip(["top", "bottom", "meat"]) {
        // A probe that fails here is reported by the supervisor every tick.
        if let Err(code) = probe.configure() {
            warn!("Probe {name}: configure failed ({code})");
        }
    }
    let [top, bottom, meat] = probes;
    let hub = SensorHub::new(top, bottom, meat, config.probe_offsets);

    // ── 4. Relays ─────────────────────────────────────────────
    let relays = RelayBank::new(
        Relay::new(PinDriver::output(p.pins.gpio4.downgrade_output())?, "heater", RELAY_ACTIVE_LOW),
        Relay::new(PinDriver::output(p.pins.gpio5.downgrade_output())?, "fan", RELAY_ACTIVE_LOW),
        Relay::new(PinDriver::output(p.pins.gpio6.downgrade_output())?, "smoker", RELAY_ACTIVE_LOW),
    );

    // ── 5. Host link (UART0 → USB bridge) ─────────────────────
    let uart = UartDriver::new(
        p.uart0,
        p.pins.gpio43,
        p.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(HOST_BAUD)),
    )?;
    let transport = UartTransport::new(uart);

    // ── 6. Tasks ──────────────────────────────────────────────
    let service = ControlService::new(&config, hub, Arc::clone(&shared));
    let control = ControlTask::new(
        &config,
        service,
        relays,
        Arc::clone(&watchdog),
        LinkEventSink::new(Arc::clone(&shared)),
        Arc::clone(&shared),
    );

    let mut comm = CommTask::new(
        &config,
        transport,
        Arc::clone(&watchdog),
        LinkEventSink::new(Arc::clone(&shared)),
        Arc::clone(&shared),
    );
    match serde_json::to_string(&config) {
        Ok(json) => comm.announce(&format_args!("config {json}")),
        Err(e) => warn!("Config dump failed: {e}"),
    }

    let control_handle = spawn_on_core(Core::App, 10, 8, "control\0", move || {
        let clock = MonotonicClock::new();
        control.run(&clock)
    })?;
    let comm_handle = spawn_on_core(Core::Pro, 5, 8, "comm\0", move || {
        let clock = MonotonicClock::new();
        comm.run(&clock)
    })?;

    info!("System ready at {} ms", MonotonicClock::new().now_ms());

    // Neither task returns; a join only completes if one panicked, and
    // the watchdog then resets the chip once the survivor withholds.
    for (name, handle) in [("control", control_handle), ("comm", comm_handle)] {
        if handle.join().is_err() {
            error!("Task '{name}' panicked");
        }
    }
    Ok(())
}
