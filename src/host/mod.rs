//! Host link — line-oriented commands in, telemetry and diagnostics out.
//!
//! ```text
//!   Transport ──bytes──▶ LineAssembler ──lines──▶ CommandHandler ──▶ SharedState
//!   Transport ◀──JSON── TelemetryPublisher ◀──────── SharedState (status)
//!   Transport ◀──"# …"── diag ◀── diagnostics queue ◀── LinkEventSink
//! ```

pub mod diag;
pub mod handler;
pub mod line;
pub mod telemetry;
pub mod transport;
