//! Integration test harness.
//!
//! Drives the full analysis pipeline through the port boundary with mock
//! adapters — no real probes, radios, or delays.

mod mock_hw;

mod analysis_flow_tests;
mod command_tests;
mod trigger_tests;
