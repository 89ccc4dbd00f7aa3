//! Error taxonomy for the capture core.
//!
//! Malformed inbound frames are deliberately absent here: they are recovered
//! where they occur (logged and discarded by the channel reader) and never
//! propagate.

use thiserror::Error;

/// The capture executable could not be launched.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("capture command `{command}` not found")]
    NotFound { command: String },
    #[error("failed to spawn capture command `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// The streaming channel could not be established.
#[derive(Debug, Error)]
#[error("failed to connect to {endpoint}: {reason}")]
pub struct ConnectError {
    pub endpoint: String,
    pub reason: String,
}

/// Why `start()` aborted before the session became active.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

/// One-shot upload path failures.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no audio data recorded")]
    NoAudio,
    #[error("analysis request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("analysis request failed: {0}")]
    Request(#[from] reqwest::Error),
}
