//! Float to 16-bit PCM quantization
//!
//! Negative samples scale by 32768 and positive ones by 32767, so `-1.0`
//! reaches `i16::MIN` and `1.0` reaches `i16::MAX`. No dithering.

use bytes::{BufMut, Bytes, BytesMut};

/// Bytes per quantized sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Quantize one float sample to a signed 16-bit value.
pub fn quantize_sample(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0)
            .round()
            .clamp(i16::MIN as f32, i16::MAX as f32) as i16
    } else {
        (s * 32767.0).round() as i16
    }
}

/// Quantize an interleaved buffer into little-endian PCM bytes.
pub fn quantize(samples: &[f32]) -> Bytes {
    let mut pcm = BytesMut::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for &sample in samples {
        pcm.put_i16_le(quantize_sample(sample));
    }
    pcm.freeze()
}
