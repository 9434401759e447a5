//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, notify the link client,
//! collect in a test.

use crate::error::CommandError;
use crate::events::TriggerOrigin;
use crate::report::AnalysisResult;
use crate::scoring::Verdict;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// An analysis cycle began.
    AnalysisStarted(TriggerOrigin),

    /// An analysis cycle completed with a sealed result.
    AnalysisCompleted(AnalysisResult),

    /// A trigger was refused (busy or cooling down).
    AnalysisRejected { origin: TriggerOrigin, cooldown_remaining_ms: u64 },

    /// The session resolved its active profile.
    ProfileResolved { profile: String, from_fix: bool },

    /// The safety override or an advisory raised alerts on the last result.
    AlertsRaised(Vec<String>),

    /// An inbound command was rejected.
    CommandRejected(CommandError),

    /// Stored network credentials were replaced (ssid only; secret opaque).
    CredentialsUpdated { ssid: String },
}

/// Readiness summary for the link's status frame.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct StatusReport {
    pub ready: bool,
    pub analyses_run: u32,
    pub last_score: Option<u8>,
    pub last_verdict: Option<Verdict>,
    pub profile: String,
    pub uptime_ms: u64,
}
