use tokio::sync::mpsc;

use crate::error::SpawnError;

/// A discrete unit of raw PCM bytes read from the capture process.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Monotonic sequence number, assigned in read order. Strictly
    /// increasing with no gaps within a session.
    pub sequence: u64,
    /// Raw audio bytes (s16le PCM as configured).
    pub data: Vec<u8>,
}

/// How the capture process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    /// Whether this exit should be treated as a fault while a session is
    /// active. Signal termination is how `terminate()` ends the process,
    /// so only a non-zero exit code counts.
    pub fn is_failure(&self) -> bool {
        matches!(self.code, Some(code) if code != 0)
    }
}

/// The output streams of a running capture process.
///
/// Both streams end when the process does; a new spawn is required per
/// session, the streams are not restartable.
pub struct CaptureOutput {
    /// Sequence-numbered audio chunks from stdout.
    pub chunks: mpsc::Receiver<AudioChunk>,
    /// Diagnostic text lines from stderr.
    pub diagnostics: mpsc::Receiver<String>,
}

/// Control half of a running capture process.
pub trait CaptureControl: Send {
    /// Request termination. Idempotent: calling this on an already-exited
    /// or already-terminated process is a no-op.
    fn terminate(&mut self);

    /// Single-fire exit notification. The watch holds `None` until the
    /// process exits, then its final status.
    fn exit(&self) -> tokio::sync::watch::Receiver<Option<ProcessExit>>;
}

/// Launches capture processes.
///
/// The real implementation spawns the configured executable; tests
/// substitute a scripted double to drive the session manager without
/// touching an audio device.
#[async_trait::async_trait]
pub trait CaptureLauncher: Send + Sync {
    async fn launch(&self) -> Result<(Box<dyn CaptureControl>, CaptureOutput), SpawnError>;
}
