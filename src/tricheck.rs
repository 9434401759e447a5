//! Tri-Check burst sampler.
//!
//! The device's sole defense against transient sensor noise: raw point
//! readings are never trusted. Each parameter is read in B bursts of S
//! samples with configured inter-sample and inter-burst delays, and the
//! spread of the full B*S sample set is condensed into a 0-100 stability
//! percentage alongside the grand mean.
//!
//! A malfunctioning sensor does not raise an error here — it surfaces as
//! abnormally low stability, which downstream stages treat as evidence of
//! unreliability. The pipeline degrades to "I don't know", it never crashes.

use core::time::Duration;

use crate::app::ports::SleepPort;
use crate::config::SystemConfig;
use crate::report::Parameter;

/// Outcome of one Tri-Check run for a single parameter.
///
/// Owned by the scoring call that requested it; not retained afterwards.
#[derive(Debug, Clone)]
pub struct BurstResult {
    pub parameter: Parameter,
    /// Grand mean over all B*S samples, in the parameter's physical unit.
    pub mean: f32,
    /// 0-100 confidence derived from the coefficient of variation.
    pub stability: f32,
    /// Per-burst group means. Diagnostic only; never used for scoring.
    pub burst_means: Vec<f32>,
}

/// Burst-sampling engine. Holds the sampling geometry and the CV-to-stability
/// mapping policy; stateless between runs.
#[derive(Debug, Clone, Copy)]
pub struct TriCheck {
    bursts: u8,
    samples_per_burst: u8,
    sample_delay: Duration,
    burst_delay: Duration,
    cv_scale: f32,
    stability_floor: f32,
}

impl TriCheck {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            bursts: config.bursts,
            samples_per_burst: config.samples_per_burst,
            sample_delay: Duration::from_millis(u64::from(config.sample_delay_ms)),
            burst_delay: Duration::from_millis(u64::from(config.burst_delay_ms)),
            cv_scale: config.cv_scale,
            stability_floor: config.stability_floor,
        }
    }

    /// Collect B*S samples from `read` and produce one [`BurstResult`].
    ///
    /// The delays block by design — they are part of the noise-rejection
    /// scheme, not incidental latency. Non-physical (negative) readings are
    /// clamped to zero before aggregation.
    pub fn run(
        &self,
        parameter: Parameter,
        mut read: impl FnMut() -> f32,
        pacer: &mut impl SleepPort,
    ) -> BurstResult {
        let total = usize::from(self.bursts) * usize::from(self.samples_per_burst);
        let mut samples = Vec::with_capacity(total);
        let mut burst_means = Vec::with_capacity(usize::from(self.bursts));

        for burst in 0..self.bursts {
            let mut burst_sum = 0.0f32;

            for s in 0..self.samples_per_burst {
                let raw = read().max(0.0);
                burst_sum += raw;
                samples.push(raw);

                if s + 1 < self.samples_per_burst {
                    pacer.sleep(self.sample_delay);
                }
            }

            burst_means.push(burst_sum / f32::from(self.samples_per_burst));

            if burst + 1 < self.bursts {
                pacer.sleep(self.burst_delay);
            }
        }

        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let stability = self.stability_of(&samples, mean);

        BurstResult {
            parameter,
            mean,
            stability,
            burst_means,
        }
    }

    /// Map sample spread to a 0-100 stability percentage.
    ///
    /// CV = stddev / mean * 100 (0 when mean <= 0, avoiding division by
    /// zero), then stability = clamp(100 - CV * cv_scale, floor, 100).
    /// Zero variance always maps to exactly 100.
    fn stability_of(&self, samples: &[f32], mean: f32) -> f32 {
        let cv = coefficient_of_variation(samples, mean);
        (100.0 - cv * self.cv_scale).clamp(self.stability_floor, 100.0)
    }
}

/// Sample (n-1) standard deviation expressed as a percentage of the mean.
/// Returns 0 for degenerate inputs: fewer than two samples or mean <= 0.
pub fn coefficient_of_variation(samples: &[f32], mean: f32) -> f32 {
    if samples.len() < 2 || mean <= 0.0 {
        return 0.0;
    }
    let var = samples
        .iter()
        .map(|s| (s - mean) * (s - mean))
        .sum::<f32>()
        / (samples.len() - 1) as f32;
    var.sqrt() / mean * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Parameter;

    /// Sleep port that records requested delays instead of blocking.
    struct RecordingPacer {
        slept: Vec<Duration>,
    }

    impl SleepPort for RecordingPacer {
        fn sleep(&mut self, d: Duration) {
            self.slept.push(d);
        }
    }

    fn pacer() -> RecordingPacer {
        RecordingPacer { slept: Vec::new() }
    }

    fn tricheck() -> TriCheck {
        TriCheck::from_config(&SystemConfig::default())
    }

    #[test]
    fn identical_samples_give_full_stability() {
        let mut p = pacer();
        let result = tricheck().run(Parameter::Tds, || 350.0, &mut p);
        assert!((result.mean - 350.0).abs() < 1e-3);
        assert!((result.stability - 100.0).abs() < 1e-3);
    }

    #[test]
    fn noisy_samples_lose_stability() {
        let mut p = pacer();
        let mut flip = false;
        // Alternating 300/500 is a violent spread for a TDS channel.
        let result = tricheck().run(
            Parameter::Tds,
            || {
                flip = !flip;
                if flip { 300.0 } else { 500.0 }
            },
            &mut p,
        );
        assert!(result.stability < 50.0, "stability {}", result.stability);
    }

    #[test]
    fn negative_readings_clamped_before_aggregation() {
        let mut p = pacer();
        let result = tricheck().run(Parameter::Turbidity, || -4.0, &mut p);
        assert!((result.mean - 0.0).abs() < 1e-6);
        // mean <= 0 short-circuits CV to 0: a dead channel reads as steady,
        // not as an error.
        assert!((result.stability - 100.0).abs() < 1e-3);
    }

    #[test]
    fn burst_means_are_per_group() {
        let mut p = pacer();
        let mut n = 0u32;
        let result = tricheck().run(
            Parameter::Ph,
            || {
                n += 1;
                n as f32
            },
            &mut p,
        );
        assert_eq!(result.burst_means.len(), 3);
        // 3 bursts of 5 monotone samples: group means 3, 8, 13.
        assert!((result.burst_means[0] - 3.0).abs() < 1e-3);
        assert!((result.burst_means[1] - 8.0).abs() < 1e-3);
        assert!((result.burst_means[2] - 13.0).abs() < 1e-3);
    }

    #[test]
    fn delay_schedule_matches_geometry() {
        let mut p = pacer();
        let _ = tricheck().run(Parameter::DissolvedOxygen, || 7.0, &mut p);
        // 3 bursts * 4 intra-burst gaps + 2 inter-burst gaps.
        let sample_gaps = p
            .slept
            .iter()
            .filter(|d| **d == Duration::from_millis(10))
            .count();
        let burst_gaps = p
            .slept
            .iter()
            .filter(|d| **d == Duration::from_millis(200))
            .count();
        assert_eq!(sample_gaps, 12);
        assert_eq!(burst_gaps, 2);
    }

    #[test]
    fn cv_is_zero_for_zero_mean() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0, 0.0], 0.0), 0.0);
    }

    #[test]
    fn cv_uses_sample_stddev() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, sample stddev ~2.138.
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let cv = coefficient_of_variation(&samples, 5.0);
        assert!((cv - 42.76).abs() < 0.1, "cv {}", cv);
    }
}
