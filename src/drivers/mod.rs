//! Hardware drivers.  Each is dual-target: real peripherals under
//! `target_os = "espidf"`, in-memory behaviour on the host.

pub mod relay;
pub mod task_pin;
pub mod watchdog;
