//! Jal-Score computation.
//!
//! Four per-parameter sub-scores (each clamped to 0-100) are folded into a
//! weighted sum together with the overall stability term, using the active
//! profile's weight vector. A layered stability penalty then multiplies the
//! result when the reading set as a whole is untrustworthy — intentional
//! double counting: an unreliable reading is penalized both in its weighted
//! contribution and in the aggregate confidence.
//!
//! Verdict bands are fixed and non-configurable; regional tuning happens in
//! the thresholds and weights, never in the verdict mapping.

use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::profile::GeoProfile;

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Water-safety verdict, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Safe,
    Acceptable,
    Caution,
    Unsafe,
}

impl Verdict {
    /// Fixed band mapping: >=80 Safe, >=60 Acceptable, >=40 Caution,
    /// else Unsafe.
    pub fn from_score(score: f32) -> Self {
        if score >= 80.0 {
            Self::Safe
        } else if score >= 60.0 {
            Self::Acceptable
        } else if score >= 40.0 {
            Self::Caution
        } else {
            Self::Unsafe
        }
    }

    /// One severity step toward Unsafe.
    pub fn escalate(self) -> Self {
        match self {
            Self::Safe => Self::Acceptable,
            Self::Acceptable => Self::Caution,
            Self::Caution | Self::Unsafe => Self::Unsafe,
        }
    }

    /// The more severe of two verdicts.
    pub fn most_severe(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Acceptable => "ACCEPTABLE",
            Self::Caution => "CAUTION",
            Self::Unsafe => "UNSAFE",
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Raw burst means of the four scored parameters, in physical units.
/// Temperature is diagnostic only and does not enter the weighted formula.
#[derive(Debug, Clone, Copy)]
pub struct ParameterMeans {
    pub tds_ppm: f32,
    pub ph: f32,
    pub turbidity_ntu: f32,
    pub dissolved_oxygen_mg_l: f32,
}

/// Weighted-formula outcome before the safety override.
#[derive(Debug, Clone, Copy)]
pub struct WeightedScore {
    pub score: f32,
    pub verdict: Verdict,
    pub breakdown: SubScores,
    /// True when a stability penalty factor was applied.
    pub stability_penalized: bool,
}

/// Per-parameter sub-scores, kept for diagnostics and link payloads.
#[derive(Debug, Clone, Copy)]
pub struct SubScores {
    pub tds: f32,
    pub ph: f32,
    pub turbidity: f32,
    pub dissolved_oxygen: f32,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scoring engine bound to one system configuration. The active profile is
/// passed per call so one engine serves any resolved region.
pub struct ScoringEngine {
    config: SystemConfig,
}

impl ScoringEngine {
    pub fn new(config: SystemConfig) -> Self {
        Self { config }
    }

    /// Compute the Jal-Score for one set of burst means under `profile`.
    /// `stability` is the overall 0-100 confidence (mean of the Tri-Checked
    /// parameters' stabilities).
    pub fn score(
        &self,
        means: &ParameterMeans,
        stability: f32,
        profile: &GeoProfile,
    ) -> WeightedScore {
        let th = &profile.thresholds;
        let w = &profile.weights;

        let breakdown = SubScores {
            tds: ramp_down(means.tds_ppm, th.tds_safe, th.tds_danger),
            ph: self.ph_sub_score(means.ph),
            turbidity: ramp_down(means.turbidity_ntu, th.turbidity_safe, th.turbidity_danger),
            dissolved_oxygen: do_sub_score(means.dissolved_oxygen_mg_l),
        };

        let stability = stability.clamp(0.0, 100.0);
        let weighted = breakdown.tds * w.tds
            + breakdown.ph * w.ph
            + breakdown.turbidity * w.turbidity
            + breakdown.dissolved_oxygen * w.dissolved_oxygen
            + stability * w.stability;

        let (score, stability_penalized) = self.apply_stability_penalty(weighted, stability);
        let score = score.clamp(0.0, 100.0);

        WeightedScore {
            score,
            verdict: Verdict::from_score(score),
            breakdown,
            stability_penalized,
        }
    }

    /// Soft/hard multiplicative penalty below the configured trust
    /// thresholds. Layered on top of the stability term already inside the
    /// weighted sum.
    fn apply_stability_penalty(&self, score: f32, stability: f32) -> (f32, bool) {
        let c = &self.config;
        if stability < c.stability_hard_threshold {
            (score * c.stability_hard_penalty, true)
        } else if stability < c.stability_soft_threshold {
            (score * c.stability_soft_penalty, true)
        } else {
            (score, false)
        }
    }

    /// Peak at the configured optimum; linear penalty per pH unit inside the
    /// safe band, steeper penalty beyond the band edge, floored at 0.
    fn ph_sub_score(&self, ph: f32) -> f32 {
        let c = &self.config;
        let distance = (ph - c.ph_optimal).abs();
        let band_reach = if ph < c.ph_optimal {
            c.ph_optimal - c.ph_band_low
        } else {
            c.ph_band_high - c.ph_optimal
        };

        let score = if distance <= band_reach {
            100.0 - c.ph_in_band_slope * distance
        } else {
            100.0 - c.ph_in_band_slope * band_reach
                - c.ph_out_band_slope * (distance - band_reach)
        };
        score.clamp(0.0, 100.0)
    }
}

/// Full credit at or below `safe`, linearly down to zero at `danger`, zero
/// beyond. Shared by the TDS and turbidity sub-scores.
fn ramp_down(value: f32, safe: f32, danger: f32) -> f32 {
    if value <= safe {
        100.0
    } else if value >= danger {
        0.0
    } else {
        (danger - value) / (danger - safe) * 100.0
    }
}

/// Banded dissolved-oxygen score. Both too-low and too-high DO indicate
/// failure modes (organic load vs. supersaturation), so this is not a
/// simple ramp.
fn do_sub_score(do_mg_l: f32) -> f32 {
    match do_mg_l {
        x if x < 3.0 => 10.0,         // hypoxic
        x if x < 5.0 => 40.0,         // low
        x if x < 6.5 => 75.0,         // mildly low
        x if x <= 9.5 => 100.0,       // optimal band
        x if x <= 12.0 => 80.0,       // mildly high
        _ => 50.0,                    // supersaturated
    }
}
