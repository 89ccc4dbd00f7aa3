//! Streaming channel to the analysis backend
//!
//! Outbound frames are raw binary PCM; inbound frames are JSON messages
//! tagged with a `type` discriminator. The client distinguishes a clean
//! close from an unclean one so the session manager can decide whether to
//! surface an error.

pub mod client;
pub mod connector;
pub mod messages;

pub use client::WsConnector;
pub use connector::{ChannelConnector, ChannelHandle, ChannelState, CloseKind};
pub use messages::{ActionItem, AnalysisResult, InboundMessage};
