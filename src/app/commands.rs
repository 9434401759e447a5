//! Inbound commands to the application service.
//!
//! Actions requested by the outside world (link client, CLI, dispatch loop)
//! that the [`AppService`](super::service::AppService) interprets and acts
//! upon.

use crate::events::TriggerOrigin;
use crate::link::ClientCommand;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Run one full analysis cycle now (subject to the busy/cooldown guard).
    RunAnalysis(TriggerOrigin),

    /// Report readiness and last-result summary over the link.
    ReportStatus,

    /// Replace the stored network credentials. The secret is opaque to the
    /// core and is never logged in cleartext.
    UpdateCredentials(LinkCredentials),

    /// Explicitly select a regional profile for subsequent sessions.
    SetProfile(String),
}

/// Network credentials received from the client. `Debug` is implemented by
/// hand so the secret cannot leak through derive.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LinkCredentials {
    pub ssid: String,
    pub secret: String,
}

impl core::fmt::Debug for LinkCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinkCredentials")
            .field("ssid", &self.ssid)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Decoded client frames map one-to-one onto service commands; triggers
/// arriving over the link carry their origin with them.
impl From<ClientCommand> for AppCommand {
    fn from(cmd: ClientCommand) -> Self {
        match cmd {
            ClientCommand::Analyze => Self::RunAnalysis(TriggerOrigin::Link),
            ClientCommand::Status => Self::ReportStatus,
            ClientCommand::SetCredentials { ssid, secret } => {
                Self::UpdateCredentials(LinkCredentials { ssid, secret })
            }
            ClientCommand::SetProfile { name } => Self::SetProfile(name),
        }
    }
}
