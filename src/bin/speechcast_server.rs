//! speechcast-server — 提供原始文档与语音合成的 HTTP 服务
//!
//! Usage:
//!   speechcast-server [--config <path>]
//!
//! Serves the built-in sample documents on `GET /getFormat` and synthesizes
//! posted markup on `POST /tts`, caching audio in `server.cache_dir`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use speechcast::config::Config;
use speechcast::ingest::SourceCatalog;
use speechcast::server::{serve, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = match parse_args(&args) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: speechcast-server [--config <path>]");
            std::process::exit(2);
        }
    };

    let config = Config::load(config_path.as_deref()).context("loading configuration")?;
    tracing::info!(
        "Starting speechcast-server v{} (cache dir {})",
        env!("CARGO_PKG_VERSION"),
        config.server.cache_dir.display()
    );

    let provider = config
        .build_provider()
        .context("configuring synthesis provider")?;
    let cache = config.build_cache(Arc::new(provider));
    let state = AppState::new(SourceCatalog::samples(), cache);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Option<PathBuf>, String> {
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--version" | "-V" => {
                println!("speechcast-server {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(config)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
