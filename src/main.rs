//! WAV Bridge
//!
//! An HTTP service that turns browser audio uploads (WebM, Ogg, M4A, MP3,
//! ...) into canonical 16-bit PCM WAV files, passing uploads that already
//! are PCM WAV through untouched, and optionally forwarding the result to
//! a voice-analysis service.

mod analysis;
mod config;
mod config_file;
mod error;
mod ffmpeg;
mod http;
#[cfg(test)]
mod integration;
mod state;
mod transcode;
mod wav;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::error::{ConvertError, Result};
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "wav-bridge";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let first = args.next();

    // `--generate-config [path]` writes a default config file and exits
    if first.as_deref() == Some("--generate-config") {
        let path = args.next().unwrap_or_else(|| "config.toml".to_string());
        config_file::generate_default_config(&path)
            .map_err(|e| ConvertError::Config(format!("writing {}: {}", path, e)))?;
        println!("Wrote default configuration to {}", path);
        return Ok(());
    }

    // Load configuration
    let config_path = first.unwrap_or_else(|| "config.toml".to_string());
    let loaded = config_file::try_load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize logging
    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let Err(e) = &loaded {
        tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            config_path,
            e
        );
    }
    tracing::info!("FFmpeg version: {}", ffmpeg::version_info());

    // Initialize FFmpeg
    ffmpeg::init()?;
    ffmpeg::quiet_library_logs();
    tracing::info!("FFmpeg initialized successfully");
    tracing::info!("Configuration loaded: {:?}", config);

    // Create application state
    let state = Arc::new(AppState::new(config.clone()));

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = config.socket_addr().parse().map_err(|e| {
        ConvertError::Config(format!("invalid listen address {}: {}", config.socket_addr(), e))
    })?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging with tracing
///
/// `RUST_LOG` wins over the configured level when it is set.
fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
