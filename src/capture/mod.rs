//! Native audio capture process management
//!
//! The capture executable (arecord/ffmpeg/sox, per configuration) emits raw
//! PCM on stdout and diagnostics on stderr. This module wraps its lifecycle:
//! spawn, chunked stdout stream, stderr line stream, single-fire exit
//! notification, idempotent terminate.

pub mod backend;
pub mod process;

pub use backend::{AudioChunk, CaptureControl, CaptureLauncher, CaptureOutput, ProcessExit};
pub use process::{CaptureProcess, ProcessLauncher};
