//! Link layer — typed frames for the wireless display client.
//!
//! Wire format is line-delimited JSON: one serde-encoded frame per line,
//! newline-terminated. Typed structs on both directions replace ad hoc
//! string assembly; nothing in this module scans for delimiters by hand.
//!
//! Outbound: [`DeviceFrame`] (analysis record, status report, error).
//! Inbound: [`ClientCommand`] (trigger analysis, request status, update
//! stored credentials, select profile). Malformed inbound lines are
//! rejected with a typed error and a logged warning — they never disturb an
//! analysis in progress.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::events::StatusReport;
use crate::error::{CommandError, CommsError};
use crate::report::AnalysisRecord;

/// Maximum encoded frame size (protects the link buffer).
pub const MAX_FRAME_SIZE: usize = 4096;

// ---------------------------------------------------------------------------
// Outbound frames
// ---------------------------------------------------------------------------

/// Frames the device sends to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceFrame {
    /// A completed analysis, flattened to the key-value contract.
    AnalysisResult {
        #[serde(flatten)]
        record: AnalysisRecord,
    },
    /// Readiness / last-result summary.
    Status {
        #[serde(flatten)]
        report: StatusReport,
    },
    /// Non-fatal device-side error notice.
    Error { message: String },
}

/// Encode a frame as one newline-terminated JSON line.
pub fn encode_frame(frame: &DeviceFrame) -> Result<String, CommsError> {
    let mut line = serde_json::to_string(frame).map_err(|_| CommsError::FrameTooLarge)?;
    if line.len() + 1 > MAX_FRAME_SIZE {
        return Err(CommsError::FrameTooLarge);
    }
    line.push('\n');
    Ok(line)
}

// ---------------------------------------------------------------------------
// Inbound commands
// ---------------------------------------------------------------------------

/// Command vocabulary accepted from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Trigger one analysis cycle now.
    Analyze,
    /// Ask for a readiness/status frame.
    Status,
    /// Replace stored network credentials. The secret is treated as opaque
    /// bytes by the core.
    SetCredentials { ssid: String, secret: String },
    /// Select a regional profile by registry key.
    SetProfile { name: String },
}

/// Parse one inbound line into a command. Rejections are logged without
/// echoing the payload, which may contain a credential secret.
pub fn decode_command(line: &str) -> Result<ClientCommand, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_FRAME_SIZE {
        warn!("link: rejected inbound frame (empty or oversized)");
        return Err(CommandError::Malformed);
    }
    serde_json::from_str(trimmed).map_err(|e| {
        warn!(
            "link: rejected inbound frame ({} at byte {})",
            classify(&e),
            e.column()
        );
        CommandError::Malformed
    })
}

/// Coarse category label for parse failures, keeping payload bytes (which
/// may contain a secret) out of the log.
fn classify(e: &serde_json::Error) -> &'static str {
    use serde_json::error::Category;
    match e.classify() {
        Category::Io => "io error",
        Category::Syntax => "syntax error",
        Category::Data => "unknown command or bad fields",
        Category::Eof => "truncated frame",
    }
}
