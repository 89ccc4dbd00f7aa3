//! HTTP control API for the presentation layer
//!
//! The window process drives capture over this surface:
//! - POST /capture/start - begin a capture session
//! - POST /capture/stop - end the session
//! - GET  /capture/replay - raw audio of the most recent session
//! - GET  /capture/status - session state snapshot
//! - GET  /capture/events - SSE stream of transcript/summary/action-item/error updates
//! - POST /capture/analyze - one-shot analysis of an uploaded recording
//! - GET  /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
