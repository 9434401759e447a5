//! Link adapters.
//!
//! [`ConsoleLink`] stands in for the wireless serial link on a development
//! host: frames go to stdout exactly as they would go down the RFCOMM pipe,
//! one JSON line each. [`ScriptedLink`] is the simulation/test double — it
//! records every sent frame and replays a scripted inbound command queue.

use std::collections::VecDeque;
use std::io::Write;

use log::info;

use crate::app::ports::LinkPort;
use crate::error::CommsError;
use crate::link::{encode_frame, ClientCommand, DeviceFrame};

// ---------------------------------------------------------------------------
// ConsoleLink
// ---------------------------------------------------------------------------

/// Writes frames to stdout, newline-delimited.
pub struct ConsoleLink;

impl LinkPort for ConsoleLink {
    fn send(&mut self, frame: &DeviceFrame) -> Result<(), CommsError> {
        let line = encode_frame(frame)?;
        let mut out = std::io::stdout().lock();
        out.write_all(line.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|_| CommsError::WriteFailed)?;
        info!("link: sent {} bytes", line.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedLink
// ---------------------------------------------------------------------------

/// Simulated link: captures outbound frames, replays scripted inbound
/// commands, and can be flipped disconnected to exercise failure paths.
pub struct ScriptedLink {
    pub connected: bool,
    pub sent: Vec<DeviceFrame>,
    inbound: VecDeque<ClientCommand>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
            inbound: VecDeque::new(),
        }
    }

    /// Queue an inbound command as if the client had sent it.
    pub fn script(&mut self, command: ClientCommand) {
        self.inbound.push_back(command);
    }

    /// Next inbound command, if the client sent one.
    pub fn poll(&mut self) -> Option<ClientCommand> {
        self.inbound.pop_front()
    }

    pub fn last_sent(&self) -> Option<&DeviceFrame> {
        self.sent.last()
    }
}

impl Default for ScriptedLink {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkPort for ScriptedLink {
    fn send(&mut self, frame: &DeviceFrame) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::NotConnected);
        }
        // Round-trip through the codec so size limits apply to the
        // simulation too.
        let _ = encode_frame(frame)?;
        self.sent.push(frame.clone());
        Ok(())
    }
}
