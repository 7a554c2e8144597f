//! Daemon wire format
//!
//! One JSON object per line in each direction. Requests are tagged by `op`;
//! replies are either `{"ok": <payload>}` or
//! `{"error": {"kind": "...", "message": "..."}}`.

use serde::{Deserialize, Serialize};

use jmctl_core::domain::port::{Direction, PortRef, Property};
use jmctl_core::domain::target::MixerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WireRequest {
    Ports { direction: Direction },
    Port { port: PortRef },
    Monitor,
    SetVolume { port: PortRef, value: f32 },
    SetBalance { port: PortRef, value: f32 },
    Connect { port: PortRef, other: String },
    Disconnect { port: PortRef, other: String },
    Toggle { port: PortRef, other: String },
    SetMonitor { port: PortRef },
    Wait { port: PortRef, property: Property },
}

impl WireRequest {
    /// Port the request is about, used to label `not_found` replies
    pub fn subject(&self) -> Option<&PortRef> {
        match self {
            WireRequest::Ports { .. } | WireRequest::Monitor => None,
            WireRequest::Port { port }
            | WireRequest::SetVolume { port, .. }
            | WireRequest::SetBalance { port, .. }
            | WireRequest::Connect { port, .. }
            | WireRequest::Disconnect { port, .. }
            | WireRequest::Toggle { port, .. }
            | WireRequest::SetMonitor { port }
            | WireRequest::Wait { port, .. } => Some(port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireReply {
    Ok(serde_json::Value),
    Error(WireError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl WireError {
    /// Map a daemon error onto the client's error type.
    ///
    /// `not_found` may name the missing port itself (`port`), otherwise the
    /// request's subject is used.
    pub fn into_mixer_error(self, subject: Option<&PortRef>) -> MixerError {
        match self.kind.as_str() {
            "not_found" => match subject {
                Some(port) => MixerError::not_found(port),
                None => MixerError::Daemon(self.message),
            },
            "no_monitor" => MixerError::NoMonitor,
            _ => MixerError::Daemon(format!("{}: {}", self.kind, self.message)),
        }
    }
}
