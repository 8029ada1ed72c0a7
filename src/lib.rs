//! Smokehouse firmware library.
//!
//! Everything except the device bootstrap lives here so the control
//! core, the host protocol and both task loops can be exercised on the
//! host.  ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod liveness;
pub mod safety;
pub mod shared;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod host;
pub mod sensors;
pub mod tasks;
