//! Capture session management
//!
//! This module provides the `SessionManager` abstraction that owns the
//! lifecycle of a capture session:
//! - Spawning and terminating the native capture process
//! - Fanning captured audio out to the replay buffer and the streaming channel
//! - Routing decoded backend messages to the presentation layer as updates
//! - Recovering from process or channel failure mid-session

mod config;
mod events;
mod manager;

pub use config::SessionConfig;
pub use events::{SessionState, SessionStatus, UpdateEvent};
pub use manager::SessionManager;
