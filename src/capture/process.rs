use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::backend::{AudioChunk, CaptureControl, CaptureLauncher, CaptureOutput, ProcessExit};
use crate::config::CaptureConfig;
use crate::error::SpawnError;

/// Stdout read size. At 16kHz mono s16le this is ~128ms of audio per chunk.
const READ_BUF_SIZE: usize = 4096;

/// Spawns the configured capture executable.
pub struct ProcessLauncher {
    config: CaptureConfig,
}

impl ProcessLauncher {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl CaptureLauncher for ProcessLauncher {
    async fn launch(&self) -> Result<(Box<dyn CaptureControl>, CaptureOutput), SpawnError> {
        let (process, output) = CaptureProcess::spawn(&self.config.command, &self.config.args)?;
        Ok((Box::new(process), output))
    }
}

/// Handle to a spawned capture process.
///
/// Owns a kill trigger and the exit notification; the child itself lives in
/// a supervisor task so termination and exit observation cannot race.
pub struct CaptureProcess {
    kill: Option<oneshot::Sender<()>>,
    exit: watch::Receiver<Option<ProcessExit>>,
}

impl CaptureProcess {
    /// Spawn `command` with `args`, stdout and stderr piped.
    pub fn spawn(command: &str, args: &[String]) -> Result<(Self, CaptureOutput), SpawnError> {
        let mut child = tokio::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    SpawnError::NotFound {
                        command: command.to_string(),
                    }
                } else {
                    SpawnError::Io {
                        command: command.to_string(),
                        source: e,
                    }
                }
            })?;

        info!("Capture process spawned: {} (pid {:?})", command, child.id());

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (diag_tx, diag_rx) = mpsc::channel(64);
        let (kill_tx, kill_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = watch::channel(None);

        if let Some(stdout) = stdout {
            tokio::spawn(read_chunks(stdout, chunk_tx));
        }
        if let Some(stderr) = stderr {
            tokio::spawn(read_diagnostics(stderr, diag_tx));
        }
        tokio::spawn(supervise(child, kill_rx, exit_tx));

        let process = Self {
            kill: Some(kill_tx),
            exit: exit_rx,
        };
        let output = CaptureOutput {
            chunks: chunk_rx,
            diagnostics: diag_rx,
        };

        Ok((process, output))
    }
}

impl CaptureControl for CaptureProcess {
    fn terminate(&mut self) {
        if let Some(kill) = self.kill.take() {
            // Send fails when the supervisor already observed an exit,
            // which makes terminate-after-exit a no-op.
            let _ = kill.send(());
        }
    }

    fn exit(&self) -> watch::Receiver<Option<ProcessExit>> {
        self.exit.clone()
    }
}

/// Read stdout into fixed-size chunks and assign sequence numbers.
async fn read_chunks(stdout: tokio::process::ChildStdout, tx: mpsc::Sender<AudioChunk>) {
    let mut stdout = stdout;
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut sequence: u64 = 0;

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break, // EOF, process is going away
            Ok(n) => {
                let chunk = AudioChunk {
                    sequence,
                    data: buf[..n].to_vec(),
                };
                sequence += 1;
                if tx.send(chunk).await.is_err() {
                    break; // receiver dropped, session is over
                }
            }
            Err(e) => {
                warn!("Error reading capture stdout: {}", e);
                break;
            }
        }
    }

    debug!("Capture stdout closed after {} chunks", sequence);
}

/// Forward stderr lines as diagnostics.
async fn read_diagnostics(stderr: tokio::process::ChildStderr, tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(stderr).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
            break;
        }
    }
}

/// Own the child: kill it on request, report its exit exactly once.
async fn supervise(
    mut child: tokio::process::Child,
    kill_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = kill_rx => {
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill capture process: {}", e);
            }
            child.wait().await
        }
    };

    let exit = match status {
        Ok(status) => ProcessExit {
            code: status.code(),
        },
        Err(e) => {
            warn!("Failed to reap capture process: {}", e);
            ProcessExit { code: None }
        }
    };

    info!("Capture process exited with code {:?}", exit.code);
    exit_tx.send_replace(Some(exit));
}
