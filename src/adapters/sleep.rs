//! Sleep adapters.
//!
//! The burst sampler's delays flow through [`SleepPort`] so the device
//! blocks for real while tests substitute an instant pacer.

use core::time::Duration;

use crate::app::ports::SleepPort;

/// Real blocking sleep for the device.
pub struct StdSleep;

impl SleepPort for StdSleep {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// No-op pacer for tests and dry runs; optionally counts requested time.
pub struct InstantSleep {
    pub total_requested: Duration,
}

impl InstantSleep {
    pub fn new() -> Self {
        Self {
            total_requested: Duration::ZERO,
        }
    }
}

impl Default for InstantSleep {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepPort for InstantSleep {
    fn sleep(&mut self, duration: Duration) {
        self.total_requested += duration;
    }
}
