//! In-memory replay buffer for the current capture session.
//!
//! Holds every audio chunk of the active session in arrival order so the
//! most recent recording can be played back locally after `stop()`. The
//! buffer is bounded by configuration; the observed upstream behavior was
//! unbounded growth, so the cap and overflow policy are explicit here.

use std::collections::VecDeque;

use tracing::warn;

use crate::config::{OverflowPolicy, ReplayConfig};

pub struct ReplayBuffer {
    chunks: VecDeque<Vec<u8>>,
    total_bytes: usize,
    max_bytes: usize,
    overflow: OverflowPolicy,
}

impl ReplayBuffer {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            chunks: VecDeque::new(),
            total_bytes: 0,
            max_bytes: config.max_bytes,
            overflow: config.overflow,
        }
    }

    /// Discard all buffered audio. Called once at the start of each session.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }

    /// Store a chunk in arrival order, applying the overflow policy when the
    /// byte cap would be exceeded.
    pub fn append(&mut self, chunk: Vec<u8>) {
        if chunk.len() > self.max_bytes {
            warn!(
                "Replay buffer cap ({} bytes) smaller than a single chunk ({} bytes), discarding",
                self.max_bytes,
                chunk.len()
            );
            return;
        }

        match self.overflow {
            OverflowPolicy::DropOldest => {
                while self.total_bytes + chunk.len() > self.max_bytes {
                    if let Some(evicted) = self.chunks.pop_front() {
                        self.total_bytes -= evicted.len();
                    } else {
                        break;
                    }
                }
            }
            OverflowPolicy::RejectNew => {
                if self.total_bytes + chunk.len() > self.max_bytes {
                    warn!(
                        "Replay buffer full ({} bytes), rejecting new chunk",
                        self.total_bytes
                    );
                    return;
                }
            }
        }

        self.total_bytes += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Concatenate all buffered chunks in append order.
    ///
    /// Returns `None` when nothing was recorded since the last `reset()`,
    /// so "no session recorded" is distinguishable from a short recording.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        if self.chunks.is_empty() {
            return None;
        }

        let mut audio = Vec::with_capacity(self.total_bytes);
        for chunk in &self.chunks {
            audio.extend_from_slice(chunk);
        }
        Some(audio)
    }

    /// Total bytes currently buffered.
    pub fn len(&self) -> usize {
        self.total_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks currently buffered.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
