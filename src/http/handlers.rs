//! HTTP request handlers
//!
//! Implements handlers for the conversion, probe, and status endpoints.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::analysis::{spawn_submit, OriginalFile};
use crate::error::ConvertError;
use crate::state::AppState;
use crate::transcode::{convert, AudioInput};
use crate::wav::{probe, WavInfo};

/// Message shown to the uploader for any undecodable file
pub const CONVERSION_FAILED: &str = "conversion failed, try a different file";

/// Header naming the path a conversion took
pub const X_CONVERSION: HeaderName = HeaderName::from_static("x-conversion");

/// Header carrying the per-request conversion id
pub const X_CONVERSION_ID: HeaderName = HeaderName::from_static("x-conversion-id");

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    ConversionFailed,
    PayloadTooLarge(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::ConversionFailed => {
                (StatusCode::UNPROCESSABLE_ENTITY, CONVERSION_FAILED.to_string())
            }
            HttpError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            HttpError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, body).into_response()
    }
}

impl From<ConvertError> for HttpError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Decode(_) | ConvertError::InvalidAudio(_) => HttpError::ConversionFailed,
            ConvertError::EmptyInput => HttpError::BadRequest("Empty upload".to_string()),
            ConvertError::PayloadTooLarge(_) => HttpError::PayloadTooLarge(err.to_string()),
            _ => HttpError::InternalError(err.to_string()),
        }
    }
}

/// Query parameters for `POST /convert`
#[derive(Debug, Default, Deserialize)]
pub struct ConvertParams {
    /// Original file name, used for the WAV hint and the download name
    pub filename: Option<String>,
    /// Forward to the analysis service (default: true when configured)
    pub analyze: Option<bool>,
}

/// Download name for the converted file: original stem + `.wav`
pub fn wav_file_name(original: Option<&str>) -> String {
    let base = original
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .unwrap_or("");
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };
    let clean: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if clean.is_empty() {
        "audio.wav".to_string()
    } else {
        format!("{}.wav", clean)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
        "ffmpeg": crate::ffmpeg::version_info(),
        "decoder": state.decoder.name(),
    }))
}

/// Conversion statistics endpoint
/// GET /debug/stats
pub async fn conversion_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.stats.snapshot()))
}

/// Convert an upload to WAV
/// POST /convert?filename=<name>&analyze=<bool>
pub async fn convert_upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConvertParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let conversion_id = Uuid::new_v4().to_string();
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut input = AudioInput::new(body);
    if let Some(media_type) = media_type {
        input = input.with_media_type(media_type);
    }
    if let Some(name) = params.filename.as_deref() {
        input = input.with_file_name(name);
    }
    let input_len = input.bytes.len();

    // Decoding is blocking FFmpeg work; run it on the blocking pool
    let worker_state = state.clone();
    let worker_input = input.clone();
    let span = tracing::info_span!("convert", conversion_id = %conversion_id);
    let result = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        convert(
            &worker_input,
            worker_state.decoder.as_ref(),
            worker_state.config.convert.passthrough,
        )
    })
    .await
    .map_err(|e| HttpError::InternalError(e.to_string()))?;

    let out = match result {
        Ok(out) => out,
        Err(e) => {
            state.stats.record_failure(input_len, &e);
            tracing::warn!(
                conversion_id = %conversion_id,
                kind = e.kind(),
                bytes = input_len,
                "Conversion failed: {}",
                e
            );
            return Err(e.into());
        }
    };
    state.stats.record_success(input_len, &out);

    tracing::info!(
        conversion_id = %conversion_id,
        outcome = out.outcome.as_str(),
        bytes_in = input_len,
        bytes_out = out.wav.len(),
        frames = out.frames,
        "Conversion complete"
    );

    if params.analyze.unwrap_or(true) {
        if let Some(client) = state.analysis.clone() {
            let original = OriginalFile {
                name: params
                    .filename
                    .clone()
                    .unwrap_or_else(|| "original_audio".to_string()),
                bytes: input.bytes.clone(),
            };
            spawn_submit(client, conversion_id.clone(), Some(original), out.wav.clone());
        }
    }

    let disposition = format!(
        "attachment; filename=\"{}\"",
        wav_file_name(params.filename.as_deref())
    );

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| HttpError::InternalError(e.to_string()))?,
    );
    response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response_headers.insert(
        X_CONVERSION,
        HeaderValue::from_static(out.outcome.as_str()),
    );
    response_headers.insert(
        X_CONVERSION_ID,
        HeaderValue::from_str(&conversion_id)
            .map_err(|e| HttpError::InternalError(e.to_string()))?,
    );

    Ok((response_headers, out.wav).into_response())
}

/// Probe response: parsed header plus derived checks
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    #[serde(flatten)]
    pub info: WavInfo,
    pub pcm: bool,
    pub frames: u64,
    pub consistent: bool,
}

/// Parse a WAV header
/// POST /probe
pub async fn probe_upload(body: Bytes) -> Result<Json<ProbeResponse>, HttpError> {
    let info = probe(&body).map_err(|e| HttpError::BadRequest(format!("Not a WAV file: {}", e)))?;
    Ok(Json(ProbeResponse {
        pcm: info.is_pcm(),
        frames: info.frames(),
        consistent: info.is_consistent(),
        info,
    }))
}
