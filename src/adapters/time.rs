//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` (µs since boot).
//! - **host**: `std::time::Instant` from construction.

use crate::app::ports::{Clock, Millis};

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> Millis {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as Millis / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}
