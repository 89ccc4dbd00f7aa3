use std::sync::{Arc, Mutex};

use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use super::connector::{ChannelConnector, ChannelHandle, ChannelState, CloseKind};
use super::messages::InboundMessage;
use crate::error::ConnectError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, tungstenite::Message>;

/// Dials the backend's streaming WebSocket endpoint.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl ChannelConnector for WsConnector {
    async fn connect(
        &self,
    ) -> Result<(Box<dyn ChannelHandle>, mpsc::Receiver<InboundMessage>), ConnectError> {
        let (channel, inbound) = WsChannel::connect(&self.url).await?;
        Ok((Box::new(channel), inbound))
    }
}

/// An established WebSocket channel.
///
/// Holds the outbound sink; a reader task owns the inbound half, decodes
/// text frames, and records how the connection ended.
pub struct WsChannel {
    sink: WsSink,
    state: Arc<watch::Sender<ChannelState>>,
    close_kind: Arc<Mutex<Option<CloseKind>>>,
}

impl WsChannel {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::Receiver<InboundMessage>), ConnectError> {
        info!("Connecting to streaming backend at {}", url);

        let (ws_stream, _response) =
            connect_async(url).await.map_err(|e| ConnectError {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;

        info!("Streaming channel open");

        let (sink, stream) = ws_stream.split();
        let (state, _) = watch::channel(ChannelState::Open);
        let state = Arc::new(state);
        let close_kind = Arc::new(Mutex::new(None));

        let (inbound_tx, inbound_rx) = mpsc::channel(64);
        tokio::spawn(read_inbound(
            stream,
            inbound_tx,
            Arc::clone(&state),
            Arc::clone(&close_kind),
        ));

        Ok((
            Self {
                sink,
                state,
                close_kind,
            },
            inbound_rx,
        ))
    }
}

#[async_trait::async_trait]
impl ChannelHandle for WsChannel {
    fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    async fn send(&mut self, frame: Vec<u8>) {
        if self.state() != ChannelState::Open {
            trace!("Channel not open, dropping {} byte frame", frame.len());
            return;
        }

        if let Err(e) = self.sink.send(tungstenite::Message::Binary(frame)).await {
            warn!("Channel send failed: {}", e);
            record_close(&self.close_kind, CloseKind::Unclean(e.to_string()));
            self.state.send_replace(ChannelState::Closed);
        }
    }

    async fn close(&mut self) {
        match self.state() {
            ChannelState::Closing | ChannelState::Closed => return,
            _ => {}
        }

        info!("Closing streaming channel");
        self.state.send_replace(ChannelState::Closing);
        // SinkExt::close performs the close handshake from our side.
        let _ = self.sink.close().await;
        record_close(&self.close_kind, CloseKind::Clean);
        self.state.send_replace(ChannelState::Closed);
    }

    fn close_kind(&self) -> Option<CloseKind> {
        self.close_kind.lock().ok().and_then(|kind| kind.clone())
    }
}

/// Decode one inbound text frame. Malformed frames are an error for the
/// caller to log and discard, never a channel fault.
pub(crate) fn decode_frame(text: &str) -> Result<InboundMessage, serde_json::Error> {
    serde_json::from_str(text)
}

fn record_close(slot: &Mutex<Option<CloseKind>>, kind: CloseKind) {
    if let Ok(mut slot) = slot.lock() {
        // First observation wins.
        if slot.is_none() {
            *slot = Some(kind);
        }
    }
}

/// Read the inbound half until the connection ends, forwarding decoded
/// messages. Messages that arrive after the capture process has exited but
/// before the channel closes are still delivered.
async fn read_inbound(
    mut stream: futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    state: Arc<watch::Sender<ChannelState>>,
    close_kind: Arc<Mutex<Option<CloseKind>>>,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(tungstenite::Message::Text(text)) => match decode_frame(&text) {
                Ok(message) => {
                    if inbound_tx.send(message).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Discarding malformed inbound frame: {}", e);
                }
            },
            Ok(tungstenite::Message::Close(frame)) => {
                debug!("Server closed channel: {:?}", frame);
                record_close(&close_kind, CloseKind::Clean);
                break;
            }
            Ok(_) => {
                // Ping/pong handled by tungstenite; binary inbound is not
                // part of the protocol.
            }
            Err(tungstenite::Error::ConnectionClosed)
            | Err(tungstenite::Error::AlreadyClosed) => {
                record_close(&close_kind, CloseKind::Clean);
                break;
            }
            Err(e) => {
                warn!("Channel error: {}", e);
                record_close(&close_kind, CloseKind::Unclean(e.to_string()));
                break;
            }
        }
    }

    // Stream ended without a close frame: clean only if we asked for it.
    let kind = if *state.borrow() == ChannelState::Closing {
        CloseKind::Clean
    } else {
        CloseKind::Unclean("connection closed unexpectedly".to_string())
    };
    record_close(&close_kind, kind);
    state.send_replace(ChannelState::Closed);

    debug!("Streaming channel reader finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_transcript_frame() {
        let msg = decode_frame(r#"{"type":"transcript","data":"hello world"}"#).unwrap();
        assert_eq!(msg, InboundMessage::Transcript(serde_json::json!("hello world")));
    }

    #[test]
    fn decode_unknown_type_degrades_to_noop() {
        let msg = decode_frame(r#"{"type":"speaker_labels","data":[1,2]}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
    }

    #[test]
    fn decode_malformed_frame_is_an_error() {
        assert!(decode_frame("not json at all").is_err());
        assert!(decode_frame(r#"{"data":"missing type"}"#).is_err());
    }
}
