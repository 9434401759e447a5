//! Scenario-driven sensor simulation.
//!
//! Models a realistic analog channel per parameter:
//! - Per-reading electronic noise (gaussian)
//! - Slow drift whose magnitude grows as the scenario's trust factor drops
//! - Scenario presets spanning clean water to a failing probe
//!
//! The simulator is an ordinary [`SampleSource`]; the scoring path never
//! learns that a reading was synthetic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::SampleSource;
use crate::report::Parameter;

// ---------------------------------------------------------------------------
// Gaussian sampling
// ---------------------------------------------------------------------------

/// Approximate a sample from N(0,1) with the Irwin-Hall method: sum of 12
/// uniform [0,1) values minus 6.
fn approx_std_normal(rng: &mut StdRng) -> f32 {
    let mut sum = 0.0f32;
    for _ in 0..12 {
        sum += rng.gen::<f32>();
    }
    sum - 6.0
}

/// Sample from N(mean, sigma).
fn gaussian(rng: &mut StdRng, mean: f32, sigma: f32) -> f32 {
    mean + sigma * approx_std_normal(rng)
}

// ---------------------------------------------------------------------------
// Scenario presets
// ---------------------------------------------------------------------------

/// Named water scenarios for testing without hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Spring-quality source: low solids, neutral pH, well oxygenated.
    CleanWater,
    /// Typical municipal tap: moderate solids, slight chlorination shift.
    TapWater,
    /// Visibly contaminated surface water: sediment and organic load.
    DirtyWater,
    /// Heavily contaminated source: every parameter in trouble.
    Contaminated,
    /// A fouled or failing probe: plausible means, violent noise.
    SensorError,
}

impl Scenario {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "clean" | "clean_water" => Self::CleanWater,
            "dirty" | "dirty_water" => Self::DirtyWater,
            "contaminated" => Self::Contaminated,
            "sensor_error" | "error" => Self::SensorError,
            _ => Self::TapWater, // default
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CleanWater => "clean_water",
            Self::TapWater => "tap_water",
            Self::DirtyWater => "dirty_water",
            Self::Contaminated => "contaminated",
            Self::SensorError => "sensor_error",
        }
    }

    /// (base, noise sigma) for one parameter, plus the scenario's trust
    /// factor (0-1): lower trust inflates drift, modelling an unstable
    /// channel rather than merely a dirty source.
    fn params(self, parameter: Parameter) -> (f32, f32, f32) {
        use Parameter::{DissolvedOxygen, Ph, Tds, Temperature, Turbidity};
        match self {
            Self::CleanWater => match parameter {
                Tds => (150.0, 10.0, 0.95),
                Turbidity => (0.5, 0.2, 0.95),
                Temperature => (25.0, 0.5, 0.95),
                Ph => (7.2, 0.05, 0.95),
                DissolvedOxygen => (7.5, 0.2, 0.95),
            },
            Self::TapWater => match parameter {
                Tds => (350.0, 25.0, 0.85),
                Turbidity => (1.5, 0.5, 0.85),
                Temperature => (28.0, 1.0, 0.85),
                Ph => (7.4, 0.1, 0.85),
                DissolvedOxygen => (6.8, 0.3, 0.85),
            },
            Self::DirtyWater => match parameter {
                Tds => (650.0, 50.0, 0.70),
                Turbidity => (8.0, 2.0, 0.70),
                Temperature => (30.0, 2.0, 0.70),
                Ph => (6.4, 0.3, 0.70),
                DissolvedOxygen => (4.5, 0.6, 0.70),
            },
            Self::Contaminated => match parameter {
                Tds => (900.0, 100.0, 0.50),
                Turbidity => (15.0, 5.0, 0.50),
                Temperature => (32.0, 3.0, 0.50),
                Ph => (5.2, 0.5, 0.50),
                DissolvedOxygen => (2.5, 0.8, 0.50),
            },
            Self::SensorError => match parameter {
                Tds => (500.0, 200.0, 0.20),
                Turbidity => (5.0, 4.0, 0.20),
                Temperature => (25.0, 10.0, 0.20),
                Ph => (7.0, 1.5, 0.20),
                DissolvedOxygen => (5.0, 2.5, 0.20),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Simulated channel
// ---------------------------------------------------------------------------

/// One simulated analog channel. Seeded explicitly so tests and demo runs
/// are reproducible.
pub struct SimulatedChannel {
    parameter: Parameter,
    base: f32,
    noise: f32,
    trust: f32,
    rng: StdRng,
}

impl SimulatedChannel {
    pub fn new(parameter: Parameter, scenario: Scenario, seed: u64) -> Self {
        let (base, noise, trust) = scenario.params(parameter);
        Self {
            parameter,
            base,
            noise,
            trust,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SampleSource for SimulatedChannel {
    fn parameter(&self) -> Parameter {
        self.parameter
    }

    fn sample(&mut self) -> f32 {
        // Instability drift on top of the per-reading noise: a low-trust
        // channel wanders, which is what Tri-Check exists to expose.
        let drift = gaussian(&mut self.rng, 0.0, self.noise * (1.0 - self.trust));
        let value = gaussian(&mut self.rng, self.base, self.noise) + drift;
        value.max(0.0)
    }
}
