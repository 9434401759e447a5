//! Cross-analysis trend tracking.
//!
//! Keeps a short sliding window of settled means per parameter and fits a
//! linear trend over it. The output is advisory only — it feeds alert text
//! ("TDS trending upward"), never the score. Drift across analyses usually
//! means a fouling probe or a changing source, both worth telling the user
//! about before they show up as bad verdicts.

use std::collections::VecDeque;

use crate::report::Parameter;

/// Window length in analyses.
const WINDOW: usize = 10;

/// Minimum samples before a trend is reported.
const MIN_SAMPLES: usize = 3;

/// Slope magnitude below which a series counts as flat, in units per
/// analysis relative to the window mean (fractional slope).
const FLAT_SLOPE: f32 = 0.02;

/// CV above which the windowed series is flagged unstable (percent).
const UNSTABLE_CV: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
    /// Not enough history yet.
    Unknown,
}

/// Windowed trend summary for one parameter.
#[derive(Debug, Clone, Copy)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    /// Absolute fitted slope, units per analysis.
    pub slope: f32,
    /// Coefficient of variation over the window (percent).
    pub cv_percent: f32,
    /// True when the window varies less than [`UNSTABLE_CV`].
    pub steady: bool,
    pub samples: usize,
}

/// Sliding-window history for the scored parameters.
pub struct TrendTracker {
    histories: Vec<(Parameter, VecDeque<f32>)>,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self {
            histories: Parameter::ALL
                .iter()
                .map(|p| (*p, VecDeque::with_capacity(WINDOW)))
                .collect(),
        }
    }

    /// Record one settled mean for `parameter`.
    pub fn record(&mut self, parameter: Parameter, value: f32) {
        if let Some((_, window)) = self.histories.iter_mut().find(|(p, _)| *p == parameter) {
            if window.len() == WINDOW {
                window.pop_front();
            }
            window.push_back(value);
        }
    }

    /// Fit a trend over the recorded window for `parameter`.
    pub fn trend(&self, parameter: Parameter) -> TrendSummary {
        let Some((_, window)) = self.histories.iter().find(|(p, _)| *p == parameter) else {
            return unknown(0);
        };
        if window.len() < MIN_SAMPLES {
            return unknown(window.len());
        }

        let n = window.len() as f32;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = window.iter().sum::<f32>() / n;

        let mut num = 0.0f32;
        let mut den = 0.0f32;
        for (i, v) in window.iter().enumerate() {
            let dx = i as f32 - x_mean;
            num += dx * (v - y_mean);
            den += dx * dx;
        }
        let slope = if den > 0.0 { num / den } else { 0.0 };

        let cv_percent = if y_mean.abs() > f32::EPSILON {
            let var = window.iter().map(|v| (v - y_mean) * (v - y_mean)).sum::<f32>() / n;
            var.sqrt() / y_mean.abs() * 100.0
        } else {
            0.0
        };

        // Flat threshold scales with the window mean so ppm-range and
        // pH-range channels are judged alike.
        let flat_cutoff = FLAT_SLOPE * y_mean.abs().max(1.0);
        let direction = if slope.abs() < flat_cutoff {
            TrendDirection::Flat
        } else if slope > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Falling
        };

        TrendSummary {
            direction,
            slope: slope.abs(),
            cv_percent,
            steady: cv_percent < UNSTABLE_CV,
            samples: window.len(),
        }
    }

    /// Advisory alert when a danger-direction drift is underway.
    pub fn advisory(&self) -> Option<String> {
        let tds = self.trend(Parameter::Tds);
        if tds.direction == TrendDirection::Rising {
            return Some(format!(
                "TDS trending upward across recent analyses (+{:.0} ppm per test)",
                tds.slope
            ));
        }
        let turb = self.trend(Parameter::Turbidity);
        if turb.direction == TrendDirection::Rising {
            return Some(format!(
                "Turbidity trending upward across recent analyses (+{:.1} NTU per test)",
                turb.slope
            ));
        }
        None
    }

    pub fn clear(&mut self) {
        for (_, window) in &mut self.histories {
            window.clear();
        }
    }
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown(samples: usize) -> TrendSummary {
    TrendSummary {
        direction: TrendDirection::Unknown,
        slope: 0.0,
        cv_percent: 0.0,
        steady: true,
        samples,
    }
}
