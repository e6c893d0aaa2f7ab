//! Decoded PCM audio
//!
//! The hand-off type between a [`Decoder`](super::decoder::Decoder) and the
//! encoder stages: one `Vec<f32>` per channel, all of the same length.

use crate::error::{ConvertError, Result};
use crate::wav::WavFormat;

/// Deinterleaved float PCM plus its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Build from per-channel sample arrays.
    ///
    /// Every channel must hold the same number of frames, and there must be
    /// at least one channel. The rate and channel count must fit the 16-bit
    /// PCM header: at most 32767 channels, and `rate * channels * 2` within
    /// 32 bits.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ConvertError::InvalidAudio("sample rate is zero".into()));
        }
        let Some(first) = channels.first() else {
            return Err(ConvertError::InvalidAudio("no channels".into()));
        };
        if channels.len() > u16::MAX as usize {
            return Err(ConvertError::InvalidAudio(format!(
                "{} channels exceeds the WAV channel field",
                channels.len()
            )));
        }
        if !WavFormat::pcm16(sample_rate, channels.len() as u16).fits_header() {
            return Err(ConvertError::InvalidAudio(format!(
                "{} Hz with {} channels does not fit a 16-bit WAV header",
                sample_rate,
                channels.len()
            )));
        }
        let frames = first.len();
        if let Some((idx, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frames)
        {
            return Err(ConvertError::InvalidAudio(format!(
                "channel {} has {} frames, channel 0 has {}",
                idx,
                ch.len(),
                frames
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let audio = DecodedAudio::new(44100, vec![vec![0.0; 10], vec![0.5; 10]]).unwrap();
        assert_eq!(audio.sample_rate(), 44100);
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frame_count(), 10);
    }

    #[test]
    fn test_zero_frames_is_valid() {
        let audio = DecodedAudio::new(16000, vec![vec![]]).unwrap();
        assert_eq!(audio.frame_count(), 0);
        assert_eq!(audio.duration_secs(), 0.0);
    }

    #[test]
    fn test_rejects_no_channels() {
        let err = DecodedAudio::new(44100, vec![]).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidAudio(_)));
    }

    #[test]
    fn test_rejects_zero_rate() {
        assert!(DecodedAudio::new(0, vec![vec![0.0]]).is_err());
    }

    #[test]
    fn test_rejects_ragged_channels() {
        let err = DecodedAudio::new(48000, vec![vec![0.0; 4], vec![0.0; 3]]).unwrap_err();
        assert!(err.to_string().contains("channel 1 has 3 frames"));
    }

    #[test]
    fn test_channel_count_bound() {
        let widest = DecodedAudio::new(8000, vec![Vec::new(); 32767]).unwrap();
        assert_eq!(widest.channel_count(), 32767);

        let err = DecodedAudio::new(8000, vec![Vec::new(); 32768]).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidAudio(_)));
        assert!(err.to_string().contains("32768 channels"));
    }

    #[test]
    fn test_byte_rate_bound() {
        assert!(DecodedAudio::new(u32::MAX / 2, vec![vec![0.0]]).is_ok());

        let err = DecodedAudio::new(3_000_000_000, vec![vec![0.0], vec![0.0]]).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidAudio(_)));
    }

    #[test]
    fn test_duration() {
        let audio = DecodedAudio::new(8000, vec![vec![0.0; 4000]]).unwrap();
        assert_eq!(audio.duration_secs(), 0.5);
    }
}
