//! RIFF/WAVE header probe
//!
//! Walks the chunk list of an in-memory file far enough to find the `fmt `
//! and `data` chunks. Unknown chunks (`LIST`, `fact`, `bext`, ...) are
//! skipped, honouring the RIFF rule that odd-sized chunks carry one pad byte.

use serde::Serialize;
use thiserror::Error;

use super::{WavFormat, WAVE_FORMAT_PCM};

/// Reasons a buffer is not a usable WAV file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Buffer too short for a RIFF header: {0} bytes")]
    TooShort(usize),

    #[error("Missing RIFF tag")]
    NotRiff,

    #[error("RIFF form type is not WAVE")]
    NotWave,

    #[error("fmt chunk is truncated ({0} bytes)")]
    TruncatedFmt(u32),

    #[error("No fmt chunk before data")]
    MissingFmt,

    #[error("No data chunk")]
    MissingData,
}

/// Parsed header fields of a WAV buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavInfo {
    pub format: WavFormat,
    /// `AudioFormat` tag from the fmt chunk (1 = integer PCM)
    pub audio_format: u16,
    /// BlockAlign as declared by the file
    pub block_align: u16,
    /// ChunkSize field of the RIFF header
    pub riff_size: u32,
    /// Offset of the first payload byte
    pub data_offset: usize,
    /// Subchunk2Size field of the data chunk
    pub data_size: u32,
    /// Length of the whole buffer that was probed
    pub total_len: usize,
}

impl WavInfo {
    pub fn is_pcm(&self) -> bool {
        self.audio_format == WAVE_FORMAT_PCM
    }

    /// Payload bytes actually present after the data chunk header
    pub fn actual_data_len(&self) -> usize {
        self.total_len.saturating_sub(self.data_offset)
    }

    /// Frame count implied by the declared data size
    pub fn frames(&self) -> u64 {
        if self.block_align == 0 {
            return 0;
        }
        self.data_size as u64 / self.block_align as u64
    }

    /// Whether both declared sizes agree with the buffer length
    pub fn is_consistent(&self) -> bool {
        let data_fits = self.data_size as u64 <= self.actual_data_len() as u64;
        let riff_matches = self.riff_size as u64 + 8 == self.total_len as u64;
        data_fits && riff_matches
    }
}

fn read_u16(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn read_u32(b: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

/// Parse the header of a WAV file held in memory.
pub fn probe(bytes: &[u8]) -> Result<WavInfo, ProbeError> {
    if bytes.len() < 12 {
        return Err(ProbeError::TooShort(bytes.len()));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(ProbeError::NotRiff);
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(ProbeError::NotWave);
    }
    let riff_size = read_u32(bytes, 4);

    let mut fmt: Option<(u16, u16, WavFormat)> = None;
    let mut pos = 12usize;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4);
        let body = pos + 8;

        match id {
            b"fmt " => {
                if size < 16 || body + 16 > bytes.len() {
                    return Err(ProbeError::TruncatedFmt(size));
                }
                let audio_format = read_u16(bytes, body);
                let channels = read_u16(bytes, body + 2);
                let sample_rate = read_u32(bytes, body + 4);
                let block_align = read_u16(bytes, body + 12);
                let bits_per_sample = read_u16(bytes, body + 14);
                fmt = Some((
                    audio_format,
                    block_align,
                    WavFormat {
                        sample_rate,
                        channels,
                        bits_per_sample,
                    },
                ));
            }
            b"data" => {
                let (audio_format, block_align, format) = fmt.ok_or(ProbeError::MissingFmt)?;
                return Ok(WavInfo {
                    format,
                    audio_format,
                    block_align,
                    riff_size,
                    data_offset: body,
                    data_size: size,
                    total_len: bytes.len(),
                });
            }
            _ => {}
        }

        let padded = size as usize + (size as usize & 1);
        pos = match body.checked_add(padded) {
            Some(next) => next,
            None => break,
        };
    }

    if fmt.is_none() {
        Err(ProbeError::MissingFmt)
    } else {
        Err(ProbeError::MissingData)
    }
}
