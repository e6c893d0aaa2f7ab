//! Audio-to-WAV transcoding
//!
//! This module handles converting uploads to canonical 16-bit PCM WAV:
//! - Pluggable decoding (FFmpeg in production) to planar f32
//! - Sample-format conversion without resampling or remixing
//! - Channel interleaving and 16-bit quantization
//! - Passthrough of uploads that already are PCM WAV

pub mod audio;
pub mod converter;
pub mod decoder;
pub mod interleave;
pub mod pipeline;
pub mod quantize;

pub use audio::DecodedAudio;
pub use decoder::{Decoder, FfmpegDecoder};
pub use pipeline::{convert, AudioInput, ConversionOutcome, ConvertedAudio, PassthroughMode};
