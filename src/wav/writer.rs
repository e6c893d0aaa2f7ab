//! Canonical WAV writer
//!
//! Header layout (all integers little-endian):
//!
//! | Offset | Field | Value |
//! |---|---|---|
//! | 0 | ChunkID | `RIFF` |
//! | 4 | ChunkSize | `36 + dataSize` |
//! | 8 | Format | `WAVE` |
//! | 12 | Subchunk1ID | `fmt ` |
//! | 16 | Subchunk1Size | `16` |
//! | 20 | AudioFormat | `1` |
//! | 22 | NumChannels | |
//! | 24 | SampleRate | |
//! | 28 | ByteRate | |
//! | 32 | BlockAlign | |
//! | 34 | BitsPerSample | |
//! | 36 | Subchunk2ID | `data` |
//! | 40 | Subchunk2Size | `dataSize` |

use bytes::{BufMut, Bytes, BytesMut};

use super::{WavFormat, WAVE_FORMAT_PCM, WAV_HEADER_LEN};
use crate::error::{ConvertError, Result};

/// Bytes counted by ChunkSize besides the payload
const RIFF_OVERHEAD: u32 = 36;

/// Largest payload whose ChunkSize still fits in 32 bits
pub const MAX_DATA_SIZE: u64 = (u32::MAX - RIFF_OVERHEAD) as u64;

/// Write the 44-byte header for a payload of `data_size` bytes.
pub fn write_header<B: BufMut>(buf: &mut B, format: &WavFormat, data_size: u32) {
    // RIFF header
    buf.put_slice(b"RIFF");
    buf.put_u32_le(RIFF_OVERHEAD + data_size);
    buf.put_slice(b"WAVE");

    // fmt chunk
    buf.put_slice(b"fmt ");
    buf.put_u32_le(16);
    buf.put_u16_le(WAVE_FORMAT_PCM);
    buf.put_u16_le(format.channels);
    buf.put_u32_le(format.sample_rate);
    buf.put_u32_le(format.byte_rate());
    buf.put_u16_le(format.block_align());
    buf.put_u16_le(format.bits_per_sample);

    // data chunk
    buf.put_slice(b"data");
    buf.put_u32_le(data_size);
}

/// Build a complete WAV file from a PCM payload.
///
/// Fails with [`ConvertError::PayloadTooLarge`] instead of letting the size
/// fields wrap, and with [`ConvertError::InvalidAudio`] when the rate and
/// channel count overflow ByteRate or BlockAlign.
pub fn encode_wav(format: &WavFormat, pcm: &[u8]) -> Result<Bytes> {
    if !format.fits_header() {
        return Err(ConvertError::InvalidAudio(format!(
            "{} Hz with {} channels overflows the WAV format fields",
            format.sample_rate, format.channels
        )));
    }
    let len = pcm.len() as u64;
    if len > MAX_DATA_SIZE {
        return Err(ConvertError::PayloadTooLarge(len));
    }
    let data_size = len as u32;

    let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + pcm.len());
    write_header(&mut out, format, data_size);
    out.put_slice(pcm);

    verify_sizes(&out)?;
    Ok(out.freeze())
}

/// Check that both size fields agree with the bytes actually emitted.
fn verify_sizes(wav: &[u8]) -> Result<()> {
    let actual = (wav.len() - WAV_HEADER_LEN) as u64;
    let chunk_size = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]) as u64;
    let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as u64;

    if data_size != actual {
        return Err(ConvertError::FormatMismatch {
            declared: data_size,
            actual,
        });
    }
    if chunk_size != RIFF_OVERHEAD as u64 + actual {
        return Err(ConvertError::FormatMismatch {
            declared: chunk_size.saturating_sub(RIFF_OVERHEAD as u64),
            actual,
        });
    }
    Ok(())
}
