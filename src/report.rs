//! Analysis result types and the flat transport record.
//!
//! One [`AnalysisResult`] is assembled per cycle and is immutable from then
//! on: it is the unit of output handed to every external consumer. For the
//! wire, it flattens into [`AnalysisRecord`], the typed key-value contract
//! shared with the display client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::Season;
use crate::scoring::Verdict;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// The five measured channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Tds,
    Ph,
    Turbidity,
    Temperature,
    DissolvedOxygen,
}

impl Parameter {
    /// The four parameters that enter the weighted formula, in scoring
    /// order. Temperature is diagnostic only.
    pub const SCORED: [Self; 4] = [Self::Tds, Self::Ph, Self::Turbidity, Self::DissolvedOxygen];

    /// All channels in report order.
    pub const ALL: [Self; 5] = [
        Self::Tds,
        Self::Ph,
        Self::Turbidity,
        Self::Temperature,
        Self::DissolvedOxygen,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Self::Tds => "ppm",
            Self::Ph => "pH",
            Self::Turbidity => "NTU",
            Self::Temperature => "degC",
            Self::DissolvedOxygen => "mg/L",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tds => "tds",
            Self::Ph => "ph",
            Self::Turbidity => "turbidity",
            Self::Temperature => "temperature",
            Self::DissolvedOxygen => "dissolved_oxygen",
        }
    }
}

/// One settled reading. Immutable once produced by the burst sampler.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParameterReading {
    pub parameter: Parameter,
    pub value: f32,
    pub unit: &'static str,
}

impl ParameterReading {
    pub fn new(parameter: Parameter, value: f32) -> Self {
        Self {
            parameter,
            value,
            unit: parameter.unit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// Complete outcome of one analysis cycle.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Final composite score after the safety override, rounded to 0-100.
    pub jal_score: u8,
    pub verdict: Verdict,
    /// Readings in [`Parameter::ALL`] order.
    pub readings: Vec<ParameterReading>,
    /// Overall 0-100 stability actually used for scoring.
    pub stability: f32,
    pub profile_name: String,
    /// City from the location fix, when one was available.
    pub city: Option<String>,
    pub season: Season,
    /// Advisory and override alerts. Empty for a fully confident, clean
    /// result; never silently folded into the score.
    pub alerts: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn reading(&self, parameter: Parameter) -> Option<f32> {
        self.readings
            .iter()
            .find(|r| r.parameter == parameter)
            .map(|r| r.value)
    }

    /// Flatten into the wire record.
    pub fn to_record(&self) -> AnalysisRecord {
        AnalysisRecord {
            tds: self.reading(Parameter::Tds).unwrap_or(0.0),
            ph: self.reading(Parameter::Ph).unwrap_or(0.0),
            turbidity: self.reading(Parameter::Turbidity).unwrap_or(0.0),
            temperature: self.reading(Parameter::Temperature).unwrap_or(0.0),
            stability: self.stability,
            jal_score: self.jal_score,
            verdict: self.verdict,
            profile: self.profile_name.clone(),
            city: self.city.clone(),
            season: self.season,
            timestamp: self.timestamp,
        }
    }
}

/// Flat key-value record for the result transport. The display client
/// depends on these field names; treat them as a wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub tds: f32,
    pub ph: f32,
    pub turbidity: f32,
    pub temperature: f32,
    pub stability: f32,
    pub jal_score: u8,
    pub verdict: Verdict,
    pub profile: String,
    pub city: Option<String>,
    pub season: Season,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Inputs gathered over one cycle, packaged by the assembler into the final
/// immutable result.
pub struct ResultAssembler<'a> {
    pub readings: Vec<ParameterReading>,
    pub stability: f32,
    pub profile_name: &'a str,
    pub city: Option<&'a str>,
    pub season: Season,
    pub alerts: Vec<String>,
}

impl ResultAssembler<'_> {
    /// Seal the cycle into an [`AnalysisResult`]. Scores arrive post-override
    /// and are rounded half-up to the integer scale.
    pub fn assemble(
        self,
        score: f32,
        verdict: Verdict,
        timestamp: DateTime<Utc>,
    ) -> AnalysisResult {
        AnalysisResult {
            jal_score: score.clamp(0.0, 100.0).round() as u8,
            verdict,
            readings: self.readings,
            stability: self.stability.clamp(0.0, 100.0),
            profile_name: self.profile_name.to_string(),
            city: self.city.map(str::to_string),
            season: self.season,
            alerts: self.alerts,
            timestamp,
        }
    }
}
