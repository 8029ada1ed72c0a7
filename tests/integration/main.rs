//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises one subsystem against the mock adapters in
//! `mock_hw`.  All tests run on the host with no real hardware.

mod comm_task_tests;
mod control_task_tests;
mod liveness_tests;
mod mock_hw;
