use crate::CaptureKind;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum CaptureError {
    /// The physical device could not be acquired.
    DeviceUnavailable(String),
    /// The target surface is missing or was destroyed.
    InvalidSurface,
    /// A one-shot delivery fired with no registered destination.
    StaleCallback(CaptureKind),
    /// A queued command failed while executing on the owner thread.
    CommandFailure(String),
    /// The driver reported an error.
    Device(String),
    /// A command or result channel is closed.
    Channel(String),
    Timeout(Duration),
    Cancelled,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::DeviceUnavailable(msg) => write!(f, "device unavailable: {msg}"),
            CaptureError::InvalidSurface => write!(f, "invalid surface"),
            CaptureError::StaleCallback(kind) => {
                write!(f, "stale {kind} callback: no destination registered")
            }
            CaptureError::CommandFailure(msg) => write!(f, "command failed: {msg}"),
            CaptureError::Device(msg) => write!(f, "device error: {msg}"),
            CaptureError::Channel(msg) => write!(f, "channel error: {msg}"),
            CaptureError::Timeout(after) => write!(f, "timed out after {after:?}"),
            CaptureError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Device(err.to_string())
    }
}
