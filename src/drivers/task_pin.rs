//! Core-pinned thread spawning for the ESP32-S3's two cores.
//!
//! `esp_pthread_set_cfg()` sets thread-local configuration for the
//! *next* `pthread_create()` from the calling thread, so the config and
//! spawn must not interleave with other thread creation on that thread.
//! On the host the core and priority are ignored.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): host link.
    Pro = 0,
    /// Core 1 (APP_CPU): control loop.
    App = 1,
}

/// Spawn `f` on `core`.  `name` must be NUL-terminated (e.g. `"control\0"`).
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<std::thread::JoinHandle<()>, Error> {
    unsafe {
        let mut cfg = esp_idf_sys::esp_pthread_get_default_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = priority as _;
        cfg.stack_size = (stack_kb * 1024) as _;
        cfg.thread_name = name.as_ptr().cast();
        esp_idf_sys::esp!(esp_idf_sys::esp_pthread_set_cfg(&cfg))
            .map_err(|_| Error::Init("esp_pthread_set_cfg"))?;
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        core,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|_| Error::Init("thread spawn"))
}

#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<std::thread::JoinHandle<()>, Error> {
    let display_name = name.trim_end_matches('\0');
    log::info!("Spawning '{}' (sim, no core pinning, stack={}KB)", display_name, stack_kb);

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|_| Error::Init("thread spawn"))
}
