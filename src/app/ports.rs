//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensor channels, the wireless link, the location
//! provider, storage) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the domain core never touches hardware directly — and never learns
//! whether a reading came from a real probe or a simulator.
//!
//! ## Security notes
//!
//! - **StoragePort** holds network credentials; implementations SHOULD
//!   protect the backing store, and callers MUST NOT log secret values in
//!   cleartext.
//! - **ConfigPort** implementations MUST validate before persisting —
//!   invalid ranges are rejected, not silently clamped.

use core::time::Duration;

use crate::config::SystemConfig;
use crate::error::{CommsError, StorageError};
use crate::link::DeviceFrame;
use crate::report::Parameter;

// ───────────────────────────────────────────────────────────────
// Sample sources (driven adapter: probe → domain)
// ───────────────────────────────────────────────────────────────

/// One raw reading on demand from a single parameter's channel, in that
/// parameter's physical unit. The channel is exclusively owned for the
/// duration of one Tri-Check; implementations need no internal locking.
pub trait SampleSource {
    fn parameter(&self) -> Parameter;
    fn sample(&mut self) -> f32;
}

/// Read-side port over the full set of channels. The domain addresses
/// channels by [`Parameter`]; the adapter decides what is behind each.
pub trait SamplePort {
    /// Read one raw value from the channel for `parameter`.
    fn sample(&mut self, parameter: Parameter) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Pacing (inter-sample / inter-burst delays)
// ───────────────────────────────────────────────────────────────

/// Blocking sleep used by the burst sampler. The delays are part of the
/// noise-rejection design; tests substitute a no-op or recording pacer.
pub trait SleepPort {
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Location / weather provider (best-effort)
// ───────────────────────────────────────────────────────────────

/// A coarse location fix.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFix {
    pub lat: f32,
    pub lon: f32,
    pub city: Option<String>,
}

/// A point-in-time weather observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherObs {
    pub ambient_temperature: f32,
    pub is_raining: bool,
    pub weathercode: u16,
}

/// Best-effort location and weather lookup. Failures are expected and must
/// never block an analysis; the service retries with bounded attempts and
/// backoff, then falls back to defaults.
pub trait LocationProvider {
    fn locate(&mut self) -> Result<GeoFix, CommsError>;
    fn weather(&mut self) -> Result<WeatherObs, CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go — serial log, link
/// notification, test capture.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Result link (domain → display client)
// ───────────────────────────────────────────────────────────────

/// Outbound frame delivery to the paired display client.
pub trait LinkPort {
    fn send(&mut self, frame: &DeviceFrame) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Persistent storage (credentials, stored config)
// ───────────────────────────────────────────────────────────────

/// Namespaced key-value storage. Writes MUST be atomic — no partial blobs
/// on power loss.
pub trait StoragePort {
    /// Read a value. Returns the stored bytes.
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, &'static str>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &SystemConfig) -> Result<(), &'static str>;
}
