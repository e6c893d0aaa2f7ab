//! Test fixtures for integration tests
//!
//! Synthetic audio so the tests need no media files on disk.

use std::f32::consts::PI;
use std::io::Cursor;

use bytes::Bytes;

use crate::transcode::DecodedAudio;
use crate::wav::{encode_wav, WavFormat};

/// A generated test clip
#[derive(Debug, Clone)]
pub struct ToneFixture {
    pub name: &'static str,
    pub sample_rate: u32,
    /// Frequency per channel in Hz
    pub frequencies: Vec<f32>,
    pub amplitude: f32,
    pub frames: usize,
}

impl ToneFixture {
    /// One second of 440 Hz, mono, 16 kHz
    pub fn voice_mono() -> Self {
        Self {
            name: "voice_mono",
            sample_rate: 16000,
            frequencies: vec![440.0],
            amplitude: 0.5,
            frames: 16000,
        }
    }

    /// Half a second of stereo with different tones left and right
    pub fn music_stereo() -> Self {
        Self {
            name: "music_stereo",
            sample_rate: 44100,
            frequencies: vec![440.0, 660.0],
            amplitude: 0.8,
            frames: 22050,
        }
    }

    /// Full-scale square-ish signal that exercises clamping
    pub fn clipped_mono() -> Self {
        Self {
            name: "clipped_mono",
            sample_rate: 8000,
            frequencies: vec![100.0],
            amplitude: 1.5,
            frames: 800,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::voice_mono(), Self::music_stereo(), Self::clipped_mono()]
    }

    pub fn channel_count(&self) -> u16 {
        self.frequencies.len() as u16
    }

    /// Planar samples for every channel
    pub fn planar(&self) -> Vec<Vec<f32>> {
        self.frequencies
            .iter()
            .map(|&freq| {
                (0..self.frames)
                    .map(|i| {
                        let t = i as f32 / self.sample_rate as f32;
                        self.amplitude * (2.0 * PI * freq * t).sin()
                    })
                    .collect()
            })
            .collect()
    }

    pub fn decoded(&self) -> DecodedAudio {
        DecodedAudio::new(self.sample_rate, self.planar()).unwrap()
    }

    /// The clip as a 16-bit PCM WAV from our own writer
    pub fn pcm16_wav(&self) -> Bytes {
        let planar = self.planar();
        let mut pcm = Vec::with_capacity(self.frames * planar.len() * 2);
        for i in 0..self.frames {
            for channel in &planar {
                let v = (channel[i].clamp(-1.0, 1.0) * 32767.0) as i16;
                pcm.extend_from_slice(&v.to_le_bytes());
            }
        }
        encode_wav(&WavFormat::pcm16(self.sample_rate, self.channel_count()), &pcm).unwrap()
    }

    /// The clip as a 32-bit float WAV written by hound
    ///
    /// Not integer PCM, so it never takes the passthrough path.
    pub fn float_wav(&self) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: self.channel_count(),
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let planar = self.planar();
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..self.frames {
                for channel in &planar {
                    writer.write_sample(channel[i]).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }
}

/// WAV as read back by hound
#[derive(Debug)]
pub struct ParsedWav {
    pub spec: hound::WavSpec,
    /// Interleaved samples
    pub samples: Vec<i16>,
}

impl ParsedWav {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.spec.channels as usize
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Vec<i16> {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.spec.channels as usize)
            .copied()
            .collect()
    }
}

/// Parse a 16-bit WAV with hound
pub fn parse_wav(bytes: &[u8]) -> ParsedWav {
    let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .unwrap();
    ParsedWav { spec, samples }
}
