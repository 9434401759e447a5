//! Mock hardware adapters for integration tests.
//!
//! Records every emitted event so tests can assert on the full history
//! without touching real channels.

use std::collections::HashMap;

use aquamind::app::events::AppEvent;
use aquamind::app::ports::{EventSink, SamplePort};
use aquamind::report::Parameter;

// ── Scripted sample port ─────────────────────────────────────

/// Fixed-value channels, optionally with a per-parameter repeating
/// sequence to fabricate a chosen amount of spread.
pub struct MockChannels {
    values: HashMap<Parameter, Vec<f32>>,
    cursors: HashMap<Parameter, usize>,
}

#[allow(dead_code)]
impl MockChannels {
    pub fn steady(tds: f32, ph: f32, turbidity: f32, temperature: f32, dox: f32) -> Self {
        let mut channels = Self {
            values: HashMap::new(),
            cursors: HashMap::new(),
        };
        channels.set(Parameter::Tds, vec![tds]);
        channels.set(Parameter::Ph, vec![ph]);
        channels.set(Parameter::Turbidity, vec![turbidity]);
        channels.set(Parameter::Temperature, vec![temperature]);
        channels.set(Parameter::DissolvedOxygen, vec![dox]);
        channels
    }

    /// Replace one channel with a repeating sequence.
    pub fn set(&mut self, parameter: Parameter, sequence: Vec<f32>) {
        assert!(!sequence.is_empty());
        self.values.insert(parameter, sequence);
        self.cursors.insert(parameter, 0);
    }
}

impl SamplePort for MockChannels {
    fn sample(&mut self, parameter: Parameter) -> f32 {
        let seq = self.values.get(&parameter).expect("channel scripted");
        let cursor = self.cursors.entry(parameter).or_insert(0);
        let value = seq[*cursor % seq.len()];
        *cursor += 1;
        value
    }
}

// ── Collecting event sink ────────────────────────────────────

pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn completed(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AnalysisCompleted(_)))
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AnalysisRejected { .. }))
            .count()
    }
}

impl Default for CollectingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
