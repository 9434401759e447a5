//! Unified error types for the AquaMind firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level dispatch loop's error handling uniform. All variants are `Copy`
//! where possible so they can be cheaply passed around without allocation.
//!
//! Note what is deliberately NOT an error here: low sensor stability and
//! absolute danger readings. Both are first-class domain signals handled by
//! the scoring pipeline and the safety override; they always produce a
//! result, never a failure.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A geo profile failed validation or lookup.
    Profile(ProfileError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// An inbound client command was rejected.
    Command(CommandError),
    /// Persistent storage failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(e) => write!(f, "profile: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Profile errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// Weight vector does not sum to 1.0 within tolerance.
    WeightsNotNormalized,
    /// A threshold pair is inverted (safe at or above danger).
    ThresholdsInverted,
    /// The requested profile name is not in the registry.
    UnknownProfile,
    /// The registry contains no entries.
    EmptyRegistry,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeightsNotNormalized => write!(f, "weights do not sum to 1.0"),
            Self::ThresholdsInverted => write!(f, "safe threshold at or above danger threshold"),
            Self::UnknownProfile => write!(f, "unknown profile"),
            Self::EmptyRegistry => write!(f, "profile registry is empty"),
        }
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The link is not connected; frame was not delivered.
    NotConnected,
    /// Frame serialization failed or exceeded the frame size limit.
    FrameTooLarge,
    /// The underlying transport write failed.
    WriteFailed,
    /// Location/weather provider unreachable after bounded retries.
    ProviderUnavailable,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "link not connected"),
            Self::FrameTooLarge => write!(f, "frame too large"),
            Self::WriteFailed => write!(f, "transport write failed"),
            Self::ProviderUnavailable => write!(f, "provider unavailable"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Rejection reasons for inbound client commands. A rejected command is
/// logged and reported; it never affects an in-progress or future analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Payload could not be parsed into a known command.
    Malformed,
    /// Analysis already running or cooldown window still open.
    Busy,
    /// Credential update carried an empty or oversized field.
    BadCredentials,
    /// Named profile or scenario does not exist.
    UnknownTarget,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed command"),
            Self::Busy => write!(f, "analyzer busy or cooling down"),
            Self::BadCredentials => write!(f, "invalid credential fields"),
            Self::UnknownTarget => write!(f, "unknown target"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Stored bytes failed deserialization.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "stored bytes corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
