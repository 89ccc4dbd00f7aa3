use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed message received on the streaming channel.
///
/// Payload shapes are opaque to this core and forwarded verbatim to the
/// presentation layer, except `error` which carries a human-readable
/// string. Unrecognized `type` values decode to `Unknown` so new backend
/// message kinds degrade to a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    Transcript(Value),
    Summary(Value),
    ActionItems(Value),
    Error(String),
    #[serde(other)]
    Unknown,
}

/// A single action item extracted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    pub task: String,
    pub owner: String,
    pub deadline: String,
}

/// Response of the one-shot analysis endpoint.
///
/// Carries the same vocabulary as the streaming messages so the
/// presentation layer can consume either path uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub summary: String,
    pub action_items: Vec<ActionItem>,
}
