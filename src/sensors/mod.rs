//! Sensor subsystem — per-parameter channels and the aggregating
//! [`SensorHub`].
//!
//! The hub owns one [`SampleSource`] per parameter and implements the
//! [`SamplePort`] the domain consumes. Whether a channel is backed by a
//! real probe or a scenario simulator is decided here, at wiring time;
//! nothing downstream can tell the difference.

pub mod sim;

use std::collections::HashMap;

use crate::app::ports::{SamplePort, SampleSource};
use crate::report::Parameter;

/// Aggregates one channel per parameter.
pub struct SensorHub {
    channels: HashMap<Parameter, Box<dyn SampleSource>>,
}

impl SensorHub {
    /// Construct a hub from pre-built channels (built in main where
    /// ownership is established). Channels are keyed by their own declared
    /// parameter; a duplicate replaces the earlier channel.
    pub fn new(channels: Vec<Box<dyn SampleSource>>) -> Self {
        let channels = channels
            .into_iter()
            .map(|c| (c.parameter(), c))
            .collect();
        Self { channels }
    }

    /// Hub with every channel simulated from one named scenario.
    pub fn simulated(scenario: sim::Scenario, seed: u64) -> Self {
        let channels: Vec<Box<dyn SampleSource>> = Parameter::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Box::new(sim::SimulatedChannel::new(*p, scenario, seed.wrapping_add(i as u64)))
                    as Box<dyn SampleSource>
            })
            .collect();
        Self::new(channels)
    }

    pub fn has_channel(&self, parameter: Parameter) -> bool {
        self.channels.contains_key(&parameter)
    }
}

impl SamplePort for SensorHub {
    /// Read one raw value from the channel for `parameter`. A missing
    /// channel reads as 0.0 — the Tri-Check then reports it as a flat dead
    /// reading rather than crashing the cycle.
    fn sample(&mut self, parameter: Parameter) -> f32 {
        match self.channels.get_mut(&parameter) {
            Some(channel) => channel.sample(),
            None => 0.0,
        }
    }
}
