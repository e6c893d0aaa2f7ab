//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{AnalysisConfig, ConvertConfig, ServerConfig};
use crate::transcode::PassthroughMode;

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Conversion settings
    pub convert: Option<ConvertSettings>,
    /// Analysis service settings
    pub analysis: Option<AnalysisSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertSettings {
    /// Maximum upload size in MB
    pub max_upload_mb: Option<usize>,
    /// Passthrough detection (sniff, strict, hint, never)
    pub passthrough: Option<PassthroughMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Analysis endpoint URL
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Forward the original upload alongside the WAV
    pub forward_original: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_enabled: Some(true),
            },
            convert: Some(ConvertSettings {
                max_upload_mb: Some(50),
                passthrough: Some(PassthroughMode::Sniff),
            }),
            analysis: Some(AnalysisSettings {
                endpoint: None,
                timeout_secs: Some(30),
                forward_original: Some(true),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let convert_defaults = ConvertConfig::default();
        let analysis_defaults = AnalysisConfig::default();
        let defaults = ServerConfig::default();

        let convert = match self.convert {
            Some(c) => ConvertConfig {
                max_upload_mb: c.max_upload_mb.unwrap_or(convert_defaults.max_upload_mb),
                passthrough: c.passthrough.unwrap_or(convert_defaults.passthrough),
            },
            None => convert_defaults,
        };

        let analysis = match self.analysis {
            Some(a) => AnalysisConfig {
                endpoint: a.endpoint,
                timeout_secs: a.timeout_secs.unwrap_or(analysis_defaults.timeout_secs),
                forward_original: a
                    .forward_original
                    .unwrap_or(analysis_defaults.forward_original),
            },
            None => analysis_defaults,
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            convert,
            analysis,
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level,
            log_format,
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}

/// Load the server configuration, using the defaults when the file does
/// not exist.
pub fn try_load<P: AsRef<Path>>(path: P) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    Ok(ConfigFile::from_file(path)?.into_server_config())
}
