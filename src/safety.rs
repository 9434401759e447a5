//! Safety override.
//!
//! The weighted formula is an average, and an average can mask a single
//! catastrophic parameter when the others look good. The override runs
//! **after** scoring and guarantees a minimum safety floor independent of
//! any profile's weighting policy: absolute danger readings force an Unsafe
//! verdict and cap the score; a collapse in stability escalates the verdict
//! one level and asks for a probe clean.
//!
//! Triggered rules accumulate in a bitmask so multiple simultaneous dangers
//! are all reported: the score cap is the minimum of the applicable caps and
//! the verdict the most severe of the applicable verdicts. Applying the
//! override to its own output is a no-op.

use core::fmt;

use log::warn;

use crate::config::SystemConfig;
use crate::scoring::{ParameterMeans, Verdict};

// ---------------------------------------------------------------------------
// Override rules
// ---------------------------------------------------------------------------

/// Individual override rules, accumulated in a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OverrideFlag {
    /// pH outside the absolute potability window.
    PhOutOfRange = 0b0000_0001,
    /// TDS above the absolute ceiling.
    TdsCeiling = 0b0000_0010,
    /// Turbidity at or above the absolute ceiling.
    TurbidityCeiling = 0b0000_0100,
    /// Overall stability below the trust floor.
    LowStability = 0b0000_1000,
}

impl OverrideFlag {
    /// Bitmask for this rule.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for OverrideFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhOutOfRange => write!(f, "pH out of range"),
            Self::TdsCeiling => write!(f, "TDS above ceiling"),
            Self::TurbidityCeiling => write!(f, "turbidity above ceiling"),
            Self::LowStability => write!(f, "stability below floor"),
        }
    }
}

/// Outcome of the override pass.
#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    pub score: f32,
    pub verdict: Verdict,
    /// Bitmask of every rule that fired (see [`OverrideFlag::mask`]).
    pub flags: u8,
    /// Human-readable alert per fired rule, for the result's alert list.
    pub alerts: Vec<String>,
}

impl OverrideOutcome {
    pub fn triggered(&self, flag: OverrideFlag) -> bool {
        self.flags & flag.mask() != 0
    }

    pub fn any_triggered(&self) -> bool {
        self.flags != 0
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// Absolute-threshold supervisor. Thresholds are tunable via config but are
/// deliberately independent of profile weights.
pub struct SafetyOverride {
    ph_min: f32,
    ph_max: f32,
    tds_ceiling_ppm: f32,
    turbidity_ceiling_ntu: f32,
    stability_floor: f32,
    score_cap: f32,
}

impl SafetyOverride {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            ph_min: config.override_ph_min,
            ph_max: config.override_ph_max,
            tds_ceiling_ppm: config.override_tds_ceiling_ppm,
            turbidity_ceiling_ntu: config.override_turbidity_ceiling_ntu,
            stability_floor: config.override_stability_floor,
            score_cap: config.override_score_cap,
        }
    }

    /// Post-process a weighted score/verdict against the raw parameter
    /// means (not sub-scores) and the overall stability.
    pub fn apply(
        &self,
        score: f32,
        verdict: Verdict,
        means: &ParameterMeans,
        stability: f32,
    ) -> OverrideOutcome {
        let mut flags = 0u8;
        let mut alerts = Vec::new();
        let mut score = score;
        let mut verdict = verdict;

        // -- Absolute danger rules: force Unsafe, cap the score ----------
        if means.ph < self.ph_min || means.ph > self.ph_max {
            flags |= OverrideFlag::PhOutOfRange.mask();
            alerts.push(format!(
                "pH {:.1} outside potable range [{:.0}, {:.0}] - do not drink untreated",
                means.ph, self.ph_min, self.ph_max
            ));
        }
        if means.tds_ppm > self.tds_ceiling_ppm {
            flags |= OverrideFlag::TdsCeiling.mask();
            alerts.push(format!(
                "TDS {:.0} ppm exceeds absolute ceiling {:.0} ppm",
                means.tds_ppm, self.tds_ceiling_ppm
            ));
        }
        if means.turbidity_ntu >= self.turbidity_ceiling_ntu {
            flags |= OverrideFlag::TurbidityCeiling.mask();
            alerts.push(format!(
                "Turbidity {:.1} NTU at or above absolute ceiling {:.1} NTU",
                means.turbidity_ntu, self.turbidity_ceiling_ntu
            ));
        }

        let danger = flags != 0;
        if danger {
            warn!("safety override: danger rules fired (0b{flags:04b})");
            score = score.min(self.score_cap);
            verdict = Verdict::Unsafe;
        }

        // -- Stability floor: escalate, never force Unsafe outright ------
        // Folding through most_severe keeps a second application a no-op.
        if stability < self.stability_floor {
            flags |= OverrideFlag::LowStability.mask();
            alerts.push(
                "Sensor stability low - clean the probes and repeat the analysis".to_string(),
            );
            let escalated = Verdict::from_score(score).escalate();
            verdict = verdict.most_severe(escalated);
        }

        OverrideOutcome {
            score,
            verdict,
            flags,
            alerts,
        }
    }
}
