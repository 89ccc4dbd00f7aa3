use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// How to invoke the native capture executable.
///
/// The default is `arecord` asking for 16kHz mono signed 16-bit little-endian
/// raw PCM on stdout. Platform-specific alternatives (ffmpeg, sox) are plain
/// configuration, not code.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    pub command: String,
    pub args: Vec<String>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: "arecord".to_string(),
            args: ["-f", "S16_LE", "-r", "16000", "-c", "1", "-t", "raw", "-"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            sample_rate: 16000,
            channels: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// WebSocket endpoint for live audio streaming.
    pub stream_url: String,
    /// HTTP endpoint for one-shot analysis of a finished recording.
    pub analyze_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            stream_url: "ws://127.0.0.1:8000/ws".to_string(),
            analyze_url: "http://127.0.0.1:8000/analyze".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Upper bound on buffered replay audio, in bytes.
    pub max_bytes: usize,
    /// What to do with a chunk that would exceed the bound.
    pub overflow: OverflowPolicy,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024, // ~35 min of 16kHz mono s16
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest chunks to make room.
    DropOldest,
    /// Keep what we have and discard the new chunk.
    RejectNew,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
