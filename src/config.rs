//! Server configuration

use serde::{Deserialize, Serialize};

use crate::transcode::PassthroughMode;

/// Conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Maximum upload size in megabytes
    pub max_upload_mb: usize,

    /// How uploads are recognised as already being WAV
    pub passthrough: PassthroughMode,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 50,
            passthrough: PassthroughMode::Sniff,
        }
    }
}

impl ConvertConfig {
    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Downstream analysis service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analysis endpoint URL; analysis is disabled when unset
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Also send the original upload as the `original` field
    pub forward_original: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
            forward_original: true,
        }
    }
}

impl AnalysisConfig {
    pub fn is_enabled(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Conversion configuration
    pub convert: ConvertConfig,

    /// Analysis service configuration
    pub analysis: AnalysisConfig,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            convert: ConvertConfig::default(),
            analysis: AnalysisConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default tracing filter directive for this configuration
    pub fn log_filter(&self) -> String {
        format!(
            "wav_bridge={},tower_http={}",
            self.log_level, self.log_level
        )
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
