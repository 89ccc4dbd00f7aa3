pub mod capture;
pub mod channel;
pub mod config;
pub mod error;
pub mod http;
pub mod replay;
pub mod session;
pub mod upload;

pub use capture::{AudioChunk, CaptureControl, CaptureLauncher, CaptureOutput, ProcessExit};
pub use channel::{
    ActionItem, AnalysisResult, ChannelConnector, ChannelHandle, ChannelState, CloseKind,
    InboundMessage,
};
pub use config::Config;
pub use error::{ConnectError, SpawnError, StartError, UploadError};
pub use http::{create_router, AppState};
pub use replay::ReplayBuffer;
pub use session::{SessionConfig, SessionManager, SessionState, SessionStatus, UpdateEvent};
pub use upload::UploadClient;
