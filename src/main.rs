use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use meeting_capture::{AppState, Config, SessionConfig, SessionManager, UploadClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Capture and streaming service for live meeting analysis")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/meeting-capture")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Capture command: {} {:?}", cfg.capture.command, cfg.capture.args);
    info!("Streaming backend: {}", cfg.backend.stream_url);

    let manager = Arc::new(SessionManager::new(SessionConfig::from(&cfg)));
    let uploader = Arc::new(UploadClient::new(cfg.backend.analyze_url.clone()));

    let app =
        meeting_capture::create_router(AppState::new(manager, uploader, cfg.replay.max_bytes));

    let bind = args
        .bind
        .unwrap_or_else(|| format!("{}:{}", cfg.service.http.bind, cfg.service.http.port));
    info!("HTTP server listening on {}", bind);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
