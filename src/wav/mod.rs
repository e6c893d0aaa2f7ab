//! RIFF/WAVE container support
//!
//! - Canonical 44-byte header writer for 16-bit PCM
//! - Structural header probe used by the passthrough check and `/probe`

pub mod probe;
pub mod writer;

use serde::Serialize;

pub use probe::{probe, ProbeError, WavInfo};
pub use writer::{encode_wav, write_header};

/// Size of the canonical header emitted by [`write_header`]
pub const WAV_HEADER_LEN: usize = 44;

/// PCM bit depth produced by the encoder
pub const PCM_BITS_PER_SAMPLE: u16 = 16;

/// `AudioFormat` value for integer PCM
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Format parameters carried in the `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// 16-bit PCM at the given rate and channel count
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: PCM_BITS_PER_SAMPLE,
        }
    }

    /// Bytes per frame (all channels), saturating at the field width
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bits_per_sample / 8)
    }

    /// Bytes per second, saturating at the field width
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.block_align() as u32)
    }

    /// BlockAlign, or `None` if it does not fit its 16-bit field
    pub fn checked_block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample / 8)
    }

    /// ByteRate, or `None` if it or BlockAlign does not fit its field
    pub fn checked_byte_rate(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(self.checked_block_align()? as u32)
    }

    /// Whether every derived header field is representable
    pub fn fits_header(&self) -> bool {
        self.checked_byte_rate().is_some()
    }
}
