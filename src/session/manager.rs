use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::events::{SessionState, SessionStatus, UpdateEvent};
use crate::capture::{CaptureControl, CaptureLauncher, CaptureOutput, ProcessExit, ProcessLauncher};
use crate::channel::{
    ChannelConnector, ChannelHandle, ChannelState, CloseKind, InboundMessage, WsConnector,
};
use crate::error::StartError;
use crate::replay::ReplayBuffer;

/// Bookkeeping for one start-to-stop lifecycle. Created on `start()`,
/// consumed when the session ends, so nothing leaks across cycles.
struct ActiveSession {
    id: String,
    started_at: DateTime<Utc>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Coordinates the capture process, the replay buffer, and the streaming
/// channel for at most one session at a time.
pub struct SessionManager {
    launcher: Arc<dyn CaptureLauncher>,
    connector: Arc<dyn ChannelConnector>,
    replay: Arc<Mutex<ReplayBuffer>>,
    events: broadcast::Sender<UpdateEvent>,
    state: Arc<watch::Sender<SessionState>>,
    session: Mutex<Option<ActiveSession>>,
}

impl SessionManager {
    /// Create a manager that spawns the configured capture executable and
    /// dials the configured streaming endpoint.
    pub fn new(config: SessionConfig) -> Self {
        let launcher = Arc::new(ProcessLauncher::new(config.capture.clone()));
        let connector = Arc::new(WsConnector::new(config.stream_url.clone()));
        Self::with_backends(config, launcher, connector)
    }

    /// Create a manager over explicit capture/channel backends. Tests use
    /// this to substitute scripted doubles.
    pub fn with_backends(
        config: SessionConfig,
        launcher: Arc<dyn CaptureLauncher>,
        connector: Arc<dyn ChannelConnector>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        let (state, _) = watch::channel(SessionState::Idle);

        Self {
            launcher,
            connector,
            replay: Arc::new(Mutex::new(ReplayBuffer::new(config.replay))),
            events,
            state: Arc::new(state),
            session: Mutex::new(None),
        }
    }

    /// Subscribe to presentation-facing updates.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Start a capture session.
    ///
    /// A no-op with a logged warning when a session is already underway.
    /// Connect or spawn failure aborts the attempt and returns the manager
    /// to `Idle`.
    pub async fn start(&self) -> Result<(), StartError> {
        let mut session = self.session.lock().await;

        if self.state() != SessionState::Idle {
            warn!("start() ignored: session already {:?}", self.state());
            return Ok(());
        }
        // A previous session's entry may linger after a fault teardown.
        session.take();

        let id = format!("session-{}", uuid::Uuid::new_v4());
        info!("Starting capture session {}", id);
        self.state.send_replace(SessionState::Starting);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = oneshot::channel();

        let ctx = SessionContext {
            launcher: Arc::clone(&self.launcher),
            connector: Arc::clone(&self.connector),
            replay: Arc::clone(&self.replay),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
        };
        let task = tokio::spawn(run_session(ctx, shutdown_rx, ready_tx));

        *session = Some(ActiveSession {
            id,
            started_at: Utc::now(),
            shutdown: shutdown_tx,
            task,
        });
        drop(session);

        match ready_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.reap().await;
                Err(e)
            }
            Err(_) => {
                // Session task ended without reporting; treat like a
                // cancelled start.
                self.reap().await;
                Ok(())
            }
        }
    }

    /// Stop the active session and wait for teardown to finish.
    ///
    /// A no-op when idle. During `Starting` this cancels the pending
    /// connect/spawn; any resource that finishes initializing afterwards is
    /// torn down rather than promoted.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;

        if self.state() == SessionState::Idle {
            warn!("stop() ignored: no active session");
            session.take();
            return;
        }

        let Some(active) = session.as_ref() else {
            return;
        };
        info!("Stopping capture session {}", active.id);
        let _ = active.shutdown.send(true);

        let mut state_rx = self.state.subscribe();
        while *state_rx.borrow_and_update() != SessionState::Idle {
            if state_rx.changed().await.is_err() {
                break;
            }
        }

        if let Some(active) = session.take() {
            if let Err(e) = active.task.await {
                error!("Session task panicked: {}", e);
            }
        }
    }

    /// Audio captured during the most recent session, concatenated in
    /// arrival order. `None` when nothing has been recorded. Valid in any
    /// state.
    pub async fn replay(&self) -> Option<Vec<u8>> {
        self.replay.lock().await.snapshot()
    }

    pub async fn status(&self) -> SessionStatus {
        let state = self.state();
        let (session_id, started_at) = {
            let session = self.session.lock().await;
            match (&*session, state) {
                (Some(active), s) if s != SessionState::Idle => {
                    (Some(active.id.clone()), Some(active.started_at))
                }
                _ => (None, None),
            }
        };
        let replay = self.replay.lock().await;

        SessionStatus {
            state,
            session_id,
            started_at,
            chunks_buffered: replay.chunk_count(),
            bytes_buffered: replay.len(),
        }
    }

    /// Drop a finished session entry after a failed or cancelled start.
    async fn reap(&self) {
        if let Some(active) = self.session.lock().await.take() {
            let _ = active.task.await;
        }
    }
}

/// A fault that ends a session from the inside.
enum Fault {
    Process { exit: ProcessExit },
    Channel { reason: String },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process { exit } => match exit.code {
                Some(code) => write!(f, "capture process exited unexpectedly (code {})", code),
                None => write!(f, "capture process was killed by a signal"),
            },
            Self::Channel { reason } => {
                write!(f, "streaming channel closed unexpectedly: {}", reason)
            }
        }
    }
}

/// Everything the session task needs from the manager.
struct SessionContext {
    launcher: Arc<dyn CaptureLauncher>,
    connector: Arc<dyn ChannelConnector>,
    replay: Arc<Mutex<ReplayBuffer>>,
    events: broadcast::Sender<UpdateEvent>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    fn forward(&self, message: InboundMessage) {
        match UpdateEvent::from_inbound(message) {
            Some(event) => {
                debug!("Forwarding {} to presentation layer", event.name());
                let _ = self.events.send(event);
            }
            None => debug!("Ignoring unknown inbound message type"),
        }
    }

    fn finish(&self, fault: Option<Fault>) {
        if let Some(fault) = fault {
            let message = fault.to_string();
            error!("Session fault: {}", message);
            let _ = self.events.send(UpdateEvent::Error(message));
        }
        self.state.send_replace(SessionState::Idle);
        info!("Session ended");
    }
}

/// Wait for the process exit notification.
async fn wait_exit(exit: &mut watch::Receiver<Option<ProcessExit>>) -> ProcessExit {
    loop {
        if let Some(status) = *exit.borrow_and_update() {
            return status;
        }
        if exit.changed().await.is_err() {
            // Supervisor vanished without reporting; count it as a kill.
            return ProcessExit { code: None };
        }
    }
}

/// One complete session: connect, spawn, fan out, tear down.
///
/// `ready` resolves once the session is either active or has failed to
/// start; `shutdown` flips to true when `stop()` is called.
async fn run_session(
    ctx: SessionContext,
    mut shutdown: watch::Receiver<bool>,
    ready: oneshot::Sender<Result<(), StartError>>,
) {
    ctx.replay.lock().await.reset();

    // Open the channel first so the capture process never runs without a
    // destination, unless stop() arrives mid-connect.
    let connected = tokio::select! {
        result = ctx.connector.connect() => result,
        _ = shutdown.changed() => {
            info!("Session cancelled before channel connected");
            ctx.finish(None);
            let _ = ready.send(Ok(()));
            return;
        }
    };

    let (mut channel, mut inbound) = match connected {
        Ok(pair) => pair,
        Err(e) => {
            ctx.finish(None);
            let _ = ready.send(Err(e.into()));
            return;
        }
    };

    let launched = tokio::select! {
        result = ctx.launcher.launch() => result,
        _ = shutdown.changed() => {
            info!("Session cancelled before capture spawned");
            channel.close().await;
            ctx.finish(None);
            let _ = ready.send(Ok(()));
            return;
        }
    };

    let (mut process, output) = match launched {
        Ok(pair) => pair,
        Err(e) => {
            channel.close().await;
            ctx.finish(None);
            let _ = ready.send(Err(e.into()));
            return;
        }
    };

    let mut exit = process.exit();

    if *shutdown.borrow() {
        // stop() landed between the selects above.
        info!("Session cancelled right after capture spawned");
        process.terminate();
        let _ = wait_exit(&mut exit).await;
        channel.close().await;
        ctx.finish(None);
        let _ = ready.send(Ok(()));
        return;
    }

    ctx.state.send_replace(SessionState::Active);
    let _ = ready.send(Ok(()));
    info!("Capture session active");

    let CaptureOutput {
        mut chunks,
        mut diagnostics,
    } = output;

    let mut fault: Option<Fault> = None;
    let mut stopping = false;
    let mut process_exited = false;
    let mut chunks_open = true;
    let mut diagnostics_open = true;

    loop {
        tokio::select! {
            _ = shutdown.changed(), if !stopping => {
                stopping = true;
                ctx.state.send_replace(SessionState::Stopping);
                // Process first; the channel closes only after its exit
                // notification fires, so no chunk meets a closing channel.
                process.terminate();
            }

            maybe_chunk = chunks.recv(), if chunks_open => match maybe_chunk {
                Some(chunk) => {
                    let mut replay = ctx.replay.lock().await;
                    if channel.state() == ChannelState::Open {
                        replay.append(chunk.data.clone());
                        drop(replay);
                        channel.send(chunk.data).await;
                    } else {
                        // Kept for replay, dropped from transmission.
                        debug!(
                            "Channel not open, chunk {} buffered only",
                            chunk.sequence
                        );
                        replay.append(chunk.data);
                    }
                }
                None => chunks_open = false,
            },

            maybe_line = diagnostics.recv(), if diagnostics_open => match maybe_line {
                Some(line) => debug!("capture: {}", line),
                None => diagnostics_open = false,
            },

            status = wait_exit(&mut exit), if !process_exited => {
                process_exited = true;
                if stopping {
                    break;
                }
                if status.is_failure() || status.code.is_none() {
                    fault = Some(Fault::Process { exit: status });
                } else {
                    info!("Capture process finished on its own");
                }
                break;
            }

            maybe_message = inbound.recv() => match maybe_message {
                Some(message) => ctx.forward(message),
                None => {
                    // Channel closed under us.
                    if !stopping {
                        let reason = match channel.close_kind() {
                            Some(CloseKind::Unclean(reason)) => reason,
                            _ => "backend closed the channel".to_string(),
                        };
                        fault = Some(Fault::Channel { reason });
                    }
                    break;
                }
            },
        }
    }

    // Teardown. Terminate is idempotent; the channel closes after the
    // process has gone away.
    if !stopping {
        ctx.state.send_replace(SessionState::Stopping);
    }
    process.terminate();
    if !process_exited {
        let _ = wait_exit(&mut exit).await;
    }

    // Late results already decoded are still forwarded before the close.
    while let Ok(message) = inbound.try_recv() {
        ctx.forward(message);
    }
    channel.close().await;

    ctx.finish(fault);
}
