//! Conversion pipeline
//!
//! One call converts one upload:
//!
//! 1. passthrough check (already a PCM WAV → return the bytes untouched)
//! 2. decode → interleave → quantize → write container
//!
//! Everything a call allocates is local to it, so concurrent conversions
//! never share buffers.

use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::transcode::decoder::Decoder;
use crate::transcode::interleave::interleave;
use crate::transcode::quantize::quantize;
use crate::wav::{encode_wav, probe, WavFormat};

/// Media types treated as WAV by the hint check
const WAV_MEDIA_TYPES: &[&str] = &["audio/wav", "audio/x-wav", "audio/wave", "audio/vnd.wave"];

/// How an upload is recognised as already being WAV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassthroughMode {
    /// Parse the RIFF header; any PCM WAV passes through
    #[default]
    Sniff,
    /// Like `Sniff`, and the declared sizes must match the buffer
    Strict,
    /// Trust the declared media type or `.wav` file name
    Hint,
    /// Always decode and re-encode
    Never,
}

/// One uploaded file as received
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub bytes: Bytes,
    pub media_type: Option<String>,
    pub file_name: Option<String>,
}

impl AudioInput {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: None,
            file_name: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Whether the declared media type or file name says WAV
    pub fn declares_wav(&self) -> bool {
        let by_type = self.media_type.as_deref().is_some_and(|mt| {
            let essence = mt.split(';').next().unwrap_or("").trim();
            WAV_MEDIA_TYPES
                .iter()
                .any(|wav| essence.eq_ignore_ascii_case(wav))
        });
        let by_name = self
            .file_name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".wav"));
        by_type || by_name
    }
}

/// Which path produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionOutcome {
    Passthrough,
    Transcoded,
}

impl ConversionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionOutcome::Passthrough => "passthrough",
            ConversionOutcome::Transcoded => "transcoded",
        }
    }
}

/// A finished WAV file
#[derive(Debug, Clone)]
pub struct ConvertedAudio {
    pub wav: Bytes,
    /// `None` only for a hinted passthrough whose header could not be read
    pub format: Option<WavFormat>,
    pub frames: u64,
    pub outcome: ConversionOutcome,
}

/// Encode already-decoded audio as 16-bit PCM WAV.
pub fn encode(audio: &crate::transcode::audio::DecodedAudio) -> Result<ConvertedAudio> {
    let format = WavFormat::pcm16(audio.sample_rate(), audio.channel_count());
    let interleaved = interleave(audio.channels());
    let pcm = quantize(&interleaved);
    let wav = encode_wav(&format, &pcm)?;

    Ok(ConvertedAudio {
        wav,
        format: Some(format),
        frames: audio.frame_count() as u64,
        outcome: ConversionOutcome::Transcoded,
    })
}

/// Return a passthrough result when the input may skip re-encoding.
fn try_passthrough(input: &AudioInput, mode: PassthroughMode) -> Option<ConvertedAudio> {
    let info = match mode {
        PassthroughMode::Never => return None,
        PassthroughMode::Hint => {
            if !input.declares_wav() {
                return None;
            }
            probe(&input.bytes).ok()
        }
        PassthroughMode::Sniff | PassthroughMode::Strict => {
            let info = probe(&input.bytes).ok()?;
            if !info.is_pcm() {
                return None;
            }
            if info.format.channels == 0 || info.block_align == 0 {
                tracing::debug!(
                    channels = info.format.channels,
                    block_align = info.block_align,
                    "WAV fmt chunk describes no frames, re-encoding"
                );
                return None;
            }
            if mode == PassthroughMode::Strict && !info.is_consistent() {
                tracing::debug!(
                    riff_size = info.riff_size,
                    data_size = info.data_size,
                    total_len = info.total_len,
                    "WAV sizes disagree with buffer, re-encoding"
                );
                return None;
            }
            Some(info)
        }
    };

    // Hint mode trusts the declaration even when the header is unreadable
    let (format, frames) = match info {
        Some(info) => (Some(info.format), info.frames()),
        None => (None, 0),
    };

    Some(ConvertedAudio {
        wav: input.bytes.clone(),
        format,
        frames,
        outcome: ConversionOutcome::Passthrough,
    })
}

/// Convert an upload to WAV.
pub fn convert(
    input: &AudioInput,
    decoder: &dyn Decoder,
    mode: PassthroughMode,
) -> Result<ConvertedAudio> {
    if input.bytes.is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    if let Some(out) = try_passthrough(input, mode) {
        tracing::debug!(
            bytes = input.bytes.len(),
            declared_wav = input.declares_wav(),
            "Input is already WAV, passing through"
        );
        return Ok(out);
    }

    let started = Instant::now();
    let audio = decoder.decode(&input.bytes)?;
    let decoded_in = started.elapsed();

    let out = encode(&audio)?;

    tracing::debug!(
        decoder = decoder.name(),
        sample_rate = audio.sample_rate(),
        channels = audio.channel_count(),
        frames = audio.frame_count(),
        duration_secs = audio.duration_secs(),
        decode_ms = decoded_in.as_millis() as u64,
        total_ms = started.elapsed().as_millis() as u64,
        "Transcoded to WAV"
    );
    Ok(out)
}
