//! Event sink that renders application events into the structured log.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Default sink: one log line per event, severity matched to meaning.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::AnalysisStarted(origin) => {
                info!("analysis started (origin {origin:?})");
            }
            AppEvent::AnalysisCompleted(result) => {
                info!(
                    "analysis complete: score {} verdict {} profile '{}'",
                    result.jal_score,
                    result.verdict.label(),
                    result.profile_name
                );
            }
            AppEvent::AnalysisRejected { origin, cooldown_remaining_ms } => {
                info!(
                    "analysis rejected (origin {origin:?}, cooldown {cooldown_remaining_ms} ms remaining)"
                );
            }
            AppEvent::ProfileResolved { profile, from_fix } => {
                info!(
                    "profile resolved: '{profile}' ({})",
                    if *from_fix { "from location fix" } else { "configured default" }
                );
            }
            AppEvent::AlertsRaised(alerts) => {
                for alert in alerts {
                    warn!("alert: {alert}");
                }
            }
            AppEvent::CommandRejected(reason) => {
                warn!("command rejected: {reason}");
            }
            AppEvent::CredentialsUpdated { ssid } => {
                info!("credentials updated for ssid '{ssid}'");
            }
        }
    }
}
