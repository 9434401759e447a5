//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the AquaMind analyzer:
//! session orchestration, the Tri-Check → scoring → override pipeline, and
//! command handling. All interaction with the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without probes, radios, or a network.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
