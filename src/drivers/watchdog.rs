//! Task Watchdog Timer (TWDT) driver.
//!
//! Both tasks refresh one TWDT *user* rather than subscribing themselves,
//! so a refresh from either task counts and the reset fires only when
//! both have stopped (one stalled, the other withholding).
//!
//! On the host the watchdog only counts feeds.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::app::ports::WatchdogPort;
use crate::error::Error;

/// Hardware reset timeout.  Well above the liveness window so a stall is
/// detected and reported before the chip resets.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    user: esp_task_wdt_user_handle_t,
    #[cfg(not(target_os = "espidf"))]
    feeds: core::sync::atomic::AtomicU32,
}

// The TWDT user handle is an opaque token; the IDF API is thread-safe.
#[cfg(target_os = "espidf")]
unsafe impl Send for Watchdog {}
#[cfg(target_os = "espidf")]
unsafe impl Sync for Watchdog {}

impl Watchdog {
    /// Configure the TWDT and register the firmware's user.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Result<Self, Error> {
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            if let Err(e) = esp!(esp_task_wdt_reconfigure(&cfg)) {
                log::warn!("TWDT reconfigure returned {} (may be uninitialised)", e);
                esp!(esp_task_wdt_init(&cfg)).map_err(|_| Error::Init("TWDT init"))?;
            }

            let mut user: esp_task_wdt_user_handle_t = core::ptr::null_mut();
            esp!(esp_task_wdt_add_user(c"smokehouse".as_ptr(), &mut user))
                .map_err(|_| Error::Init("TWDT add user"))?;
            info!("Watchdog: armed ({} ms timeout, panic on trigger)", timeout_ms);
            Ok(Self { user })
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Result<Self, Error> {
        info!("Watchdog(sim): {} ms timeout, counting feeds only", timeout_ms);
        Ok(Self {
            feeds: core::sync::atomic::AtomicU32::new(0),
        })
    }

    /// Feeds since boot (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u32 {
        self.feeds.load(core::sync::atomic::Ordering::Relaxed)
    }
}

impl WatchdogPort for Watchdog {
    fn feed(&self) {
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_task_wdt_reset_user(self.user);
        }

        #[cfg(not(target_os = "espidf"))]
        self.feeds.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
    }
}
