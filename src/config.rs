//! System configuration parameters
//!
//! All tunable policy for the AquaMind analyzer: Tri-Check geometry,
//! stability mapping, scoring curves, safety-override thresholds, and
//! session timing. Values can be overridden via stored config or a link
//! provisioning command.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Tri-Check geometry ---
    /// Number of burst groups per parameter
    pub bursts: u8,
    /// Raw samples collected within each burst
    pub samples_per_burst: u8,
    /// Delay between consecutive samples (milliseconds)
    pub sample_delay_ms: u32,
    /// Delay between burst groups (milliseconds)
    pub burst_delay_ms: u32,

    // --- Stability mapping ---
    /// Scale applied to the coefficient of variation when mapping to a
    /// stability percentage: stability = 100 - cv * cv_scale
    pub cv_scale: f32,
    /// Lowest stability the mapping can produce (0-100)
    pub stability_floor: f32,

    // --- pH scoring curve ---
    /// pH at which the sub-score peaks
    pub ph_optimal: f32,
    /// Lower edge of the pH safe band
    pub ph_band_low: f32,
    /// Upper edge of the pH safe band
    pub ph_band_high: f32,
    /// Score lost per pH unit of distance from optimal, inside the band
    pub ph_in_band_slope: f32,
    /// Score lost per pH unit beyond the band edge
    pub ph_out_band_slope: f32,

    // --- Stability penalty (layered on top of the weighted sum) ---
    /// Below this overall stability the score is multiplied by the soft penalty
    pub stability_soft_threshold: f32,
    pub stability_soft_penalty: f32,
    /// Below this overall stability the harsher penalty applies instead
    pub stability_hard_threshold: f32,
    pub stability_hard_penalty: f32,

    // --- Safety override (absolute, profile-independent) ---
    /// pH below this forces an Unsafe verdict
    pub override_ph_min: f32,
    /// pH above this forces an Unsafe verdict
    pub override_ph_max: f32,
    /// TDS (ppm) strictly above this forces an Unsafe verdict
    pub override_tds_ceiling_ppm: f32,
    /// Turbidity (NTU) at or above this forces an Unsafe verdict
    pub override_turbidity_ceiling_ntu: f32,
    /// Overall stability below this escalates the verdict one level
    pub override_stability_floor: f32,
    /// Score cap applied when any absolute danger rule fires
    pub override_score_cap: f32,

    // --- Session ---
    /// Registry key of the profile used when no location fix is available
    pub default_profile: String,
    /// Minimum gap between analysis triggers (milliseconds)
    pub trigger_cooldown_ms: u64,
    /// Location/weather lookup attempts before silent fallback
    pub locator_attempts: u8,
    /// Initial backoff between lookup attempts (milliseconds, doubles per try)
    pub locator_backoff_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Tri-Check
            bursts: 3,
            samples_per_burst: 5,
            sample_delay_ms: 10,
            burst_delay_ms: 200,

            // Stability mapping
            cv_scale: 5.0,
            stability_floor: 0.0,

            // pH curve
            ph_optimal: 7.2,
            ph_band_low: 6.5,
            ph_band_high: 8.5,
            ph_in_band_slope: 25.0,
            ph_out_band_slope: 60.0,

            // Stability penalty
            stability_soft_threshold: 70.0,
            stability_soft_penalty: 0.9,
            stability_hard_threshold: 50.0,
            stability_hard_penalty: 0.8,

            // Safety override
            override_ph_min: 4.0,
            override_ph_max: 10.0,
            override_tds_ceiling_ppm: 800.0,
            override_turbidity_ceiling_ntu: 8.0,
            override_stability_floor: 40.0,
            override_score_cap: 30.0,

            // Session
            default_profile: "jabalpur".into(),
            trigger_cooldown_ms: 5000,
            locator_attempts: 3,
            locator_backoff_ms: 500,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Invalid configs are rejected at load time,
    /// never silently clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.bursts == 0 {
            return Err("bursts must be at least 1");
        }
        if self.samples_per_burst < 2 {
            return Err("samples_per_burst must be at least 2");
        }
        if !(0.0..=100.0).contains(&self.stability_floor) {
            return Err("stability_floor must be within 0-100");
        }
        if self.cv_scale <= 0.0 {
            return Err("cv_scale must be positive");
        }
        if self.ph_band_low >= self.ph_band_high {
            return Err("ph_band_low must be below ph_band_high");
        }
        if !(self.ph_band_low..=self.ph_band_high).contains(&self.ph_optimal) {
            return Err("ph_optimal must sit inside the safe band");
        }
        if self.ph_in_band_slope <= 0.0 || self.ph_out_band_slope <= 0.0 {
            return Err("pH slopes must be positive");
        }
        if self.ph_out_band_slope < self.ph_in_band_slope {
            return Err("out-of-band pH slope must be at least the in-band slope");
        }
        if self.stability_hard_threshold >= self.stability_soft_threshold {
            return Err("hard stability threshold must be below the soft threshold");
        }
        if !(0.0..=1.0).contains(&self.stability_soft_penalty)
            || !(0.0..=1.0).contains(&self.stability_hard_penalty)
        {
            return Err("stability penalties must be factors within 0-1");
        }
        if self.override_ph_min >= self.override_ph_max {
            return Err("override_ph_min must be below override_ph_max");
        }
        if self.override_tds_ceiling_ppm <= 0.0 || self.override_turbidity_ceiling_ntu <= 0.0 {
            return Err("override ceilings must be positive");
        }
        if !(0.0..=100.0).contains(&self.override_stability_floor) {
            return Err("override_stability_floor must be within 0-100");
        }
        if !(0.0..=100.0).contains(&self.override_score_cap) {
            return Err("override_score_cap must be within 0-100");
        }
        if self.default_profile.is_empty() {
            return Err("default_profile must name a registry entry");
        }
        Ok(())
    }
}
