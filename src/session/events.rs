use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::channel::InboundMessage;

/// Session lifecycle state. `Idle` is both initial and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Starting,
    Active,
    Stopping,
}

/// A typed update delivered to the presentation layer.
///
/// Payloads are forwarded verbatim from the backend; `Error` additionally
/// covers faults raised by the session manager itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum UpdateEvent {
    Transcript(Value),
    Summary(Value),
    ActionItems(Value),
    Error(String),
}

impl UpdateEvent {
    /// Presentation-facing event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transcript(_) => "transcript-update",
            Self::Summary(_) => "summary-update",
            Self::ActionItems(_) => "action-items-update",
            Self::Error(_) => "error",
        }
    }

    /// Payload as JSON, for wire delivery.
    pub fn payload(&self) -> Value {
        match self {
            Self::Transcript(v) | Self::Summary(v) | Self::ActionItems(v) => v.clone(),
            Self::Error(message) => Value::String(message.clone()),
        }
    }

    /// Map an inbound channel message to an update. `Unknown` messages map
    /// to `None` and produce no presentation-layer event.
    pub fn from_inbound(message: InboundMessage) -> Option<Self> {
        match message {
            InboundMessage::Transcript(v) => Some(Self::Transcript(v)),
            InboundMessage::Summary(v) => Some(Self::Summary(v)),
            InboundMessage::ActionItems(v) => Some(Self::ActionItems(v)),
            InboundMessage::Error(message) => Some(Self::Error(message)),
            InboundMessage::Unknown => None,
        }
    }
}

/// Point-in-time view of the session manager.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,

    /// Identifier of the active session, if any.
    pub session_id: Option<String>,

    /// When the active session started.
    pub started_at: Option<DateTime<Utc>>,

    /// Chunks currently held for replay.
    pub chunks_buffered: usize,

    /// Bytes currently held for replay.
    pub bytes_buffered: usize,
}
