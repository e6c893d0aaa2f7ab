//! Multipart client for the analysis service

use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use super::report::AnalysisReport;
use crate::config::AnalysisConfig;

/// Longest error body kept in [`AnalysisError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Analysis submission failures
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed analysis response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Analysis is not configured")]
    NotConfigured,
}

/// The upload as the user sent it
#[derive(Debug, Clone)]
pub struct OriginalFile {
    pub name: String,
    pub bytes: Bytes,
}

/// Client for the analysis endpoint
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    forward_original: bool,
}

impl AnalysisClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        forward_original: bool,
    ) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            forward_original,
        })
    }

    /// Build a client when the configuration names an endpoint.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let endpoint = match config.endpoint.as_deref() {
            Some(e) if config.is_enabled() => e.trim(),
            _ => return Err(AnalysisError::NotConfigured),
        };
        Self::new(
            endpoint,
            Duration::from_secs(config.timeout_secs),
            config.forward_original,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, original: Option<OriginalFile>, wav: Bytes) -> Result<Form, AnalysisError> {
        let mut form = Form::new();
        if let Some(original) = original.filter(|_| self.forward_original) {
            form = form.part(
                "original",
                Part::bytes(original.bytes.to_vec()).file_name(original.name),
            );
        }
        let wav_part = Part::bytes(wav.to_vec())
            .file_name("input.wav")
            .mime_str("audio/wav")?;
        Ok(form.part("wav", wav_part))
    }

    /// Upload the files and parse the service's summary.
    pub async fn submit(
        &self,
        original: Option<OriginalFile>,
        wav: Bytes,
    ) -> Result<AnalysisReport, AnalysisError> {
        let form = self.build_form(original, wav)?;
        let response = self.http.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Submit in the background; the outcome is only logged.
pub fn spawn_submit(
    client: AnalysisClient,
    conversion_id: String,
    original: Option<OriginalFile>,
    wav: Bytes,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match client.submit(original, wav).await {
            Ok(report) => tracing::info!(
                conversion_id = %conversion_id,
                label = %report.label,
                confidence = report.confidence,
                clarity = report.clarity,
                fluency = report.fluency,
                pace = report.pace,
                "Analysis complete"
            ),
            Err(e) => tracing::warn!(
                conversion_id = %conversion_id,
                endpoint = %client.endpoint(),
                "Analysis failed: {}",
                e
            ),
        }
    })
}
