use serde::Serialize;
use tokio::sync::mpsc;

use super::messages::InboundMessage;
use crate::error::ConnectError;

/// Connection lifecycle of the streaming channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Open,
    Closing,
    Closed,
}

/// How a channel ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseKind {
    /// Explicit close, locally requested or a server close frame.
    Clean,
    /// Network failure or unexpected termination.
    Unclean(String),
}

/// Send/close half of an established channel. The inbound half is the
/// message receiver returned by [`ChannelConnector::connect`]; it yields
/// decoded messages until the channel closes, then ends.
#[async_trait::async_trait]
pub trait ChannelHandle: Send {
    fn state(&self) -> ChannelState;

    /// Send one binary frame. A no-op when the channel is not open; never
    /// fails for that reason. A transport error marks the channel closed.
    async fn send(&mut self, frame: Vec<u8>);

    /// Close the channel. Idempotent.
    async fn close(&mut self);

    /// Why the channel closed, once it has.
    fn close_kind(&self) -> Option<CloseKind>;
}

/// Establishes streaming channels. The real implementation dials the
/// backend's WebSocket endpoint; tests substitute a scripted double.
#[async_trait::async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(
        &self,
    ) -> Result<(Box<dyn ChannelHandle>, mpsc::Receiver<InboundMessage>), ConnectError>;
}
