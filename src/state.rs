//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Server configuration
//! - The decoder used for non-WAV uploads
//! - The optional analysis service client
//! - Conversion statistics

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::analysis::AnalysisClient;
use crate::config::ServerConfig;
use crate::error::ConvertError;
use crate::transcode::{ConversionOutcome, ConvertedAudio, Decoder, FfmpegDecoder};

/// Conversion counters
#[derive(Debug)]
pub struct ConversionStats {
    started_at: DateTime<Utc>,
    conversions: AtomicU64,
    passthroughs: AtomicU64,
    failures: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
    errors_by_kind: RwLock<HashMap<&'static str, u64>>,
}

/// Point-in-time copy of [`ConversionStats`]
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    pub conversions: u64,
    pub passthroughs: u64,
    pub failures: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub errors_by_kind: HashMap<String, u64>,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            conversions: AtomicU64::new(0),
            passthroughs: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            bytes_in: AtomicU64::new(0),
            bytes_out: AtomicU64::new(0),
            errors_by_kind: RwLock::new(HashMap::new()),
        }
    }

    /// Record a finished conversion
    pub fn record_success(&self, input_len: usize, out: &ConvertedAudio) {
        self.conversions.fetch_add(1, Ordering::Relaxed);
        if out.outcome == ConversionOutcome::Passthrough {
            self.passthroughs.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_in.fetch_add(input_len as u64, Ordering::Relaxed);
        self.bytes_out
            .fetch_add(out.wav.len() as u64, Ordering::Relaxed);
    }

    /// Record a failed conversion
    pub fn record_failure(&self, input_len: usize, err: &ConvertError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(input_len as u64, Ordering::Relaxed);
        *self.errors_by_kind.write().entry(err.kind()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds(),
            conversions: self.conversions.load(Ordering::Relaxed),
            passthroughs: self.passthroughs.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            errors_by_kind: self
                .errors_by_kind
                .read()
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

impl Default for ConversionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state shared by all handlers
pub struct AppState {
    pub config: ServerConfig,
    pub decoder: Arc<dyn Decoder>,
    pub analysis: Option<AnalysisClient>,
    pub stats: ConversionStats,
}

impl AppState {
    /// Create state with the FFmpeg decoder
    pub fn new(config: ServerConfig) -> Self {
        Self::with_decoder(config, Arc::new(FfmpegDecoder::new()))
    }

    /// Create state with a specific decoder
    pub fn with_decoder(config: ServerConfig, decoder: Arc<dyn Decoder>) -> Self {
        let analysis = if config.analysis.is_enabled() {
            match AnalysisClient::from_config(&config.analysis) {
                Ok(client) => {
                    tracing::info!("Analysis forwarding enabled: {}", client.endpoint());
                    Some(client)
                }
                Err(e) => {
                    tracing::warn!("Analysis client disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            decoder,
            analysis,
            stats: ConversionStats::new(),
        }
    }
}
