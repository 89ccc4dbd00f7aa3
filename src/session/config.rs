use crate::config::{CaptureConfig, Config, ReplayConfig};

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How to invoke the capture executable.
    pub capture: CaptureConfig,

    /// WebSocket endpoint of the streaming backend.
    pub stream_url: String,

    /// Replay buffer bound and overflow policy.
    pub replay: ReplayConfig,

    /// Capacity of the presentation-facing event channel.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            stream_url: "ws://127.0.0.1:8000/ws".to_string(),
            replay: ReplayConfig::default(),
            event_capacity: 256,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            capture: config.capture.clone(),
            stream_url: config.backend.stream_url.clone(),
            replay: config.replay.clone(),
            event_capacity: 256,
        }
    }
}
