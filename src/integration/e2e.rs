//! End-to-end integration tests

use std::fmt;
use std::time::Instant;

use crate::integration::fixtures::{parse_wav, ToneFixture};
use crate::transcode::pipeline::encode;
use crate::transcode::quantize::quantize_sample;
use crate::transcode::{convert, AudioInput, ConversionOutcome, FfmpegDecoder, PassthroughMode};

/// Outcome of one end-to-end check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl CheckResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![msg.into()],
        }
    }

    fn check(&mut self, ok: bool, msg: impl FnOnce() -> String) {
        if !ok {
            self.is_valid = false;
            self.errors.push(msg());
        }
    }
}

/// Compare a WAV against the fixture it was produced from.
///
/// `tolerance` is in 16-bit steps.
pub fn check_wav_matches(fixture: &ToneFixture, wav: &[u8], tolerance: i32) -> CheckResult {
    let parsed = parse_wav(wav);
    let mut result = CheckResult::success();

    result.check(parsed.spec.sample_rate == fixture.sample_rate, || {
        format!(
            "{}: sample rate {} != {}",
            fixture.name, parsed.spec.sample_rate, fixture.sample_rate
        )
    });
    result.check(parsed.spec.channels == fixture.channel_count(), || {
        format!(
            "{}: channels {} != {}",
            fixture.name,
            parsed.spec.channels,
            fixture.channel_count()
        )
    });
    result.check(parsed.spec.bits_per_sample == 16, || {
        format!("{}: {} bits per sample", fixture.name, parsed.spec.bits_per_sample)
    });
    result.check(parsed.frames() == fixture.frames, || {
        format!(
            "{}: {} frames != {}",
            fixture.name,
            parsed.frames(),
            fixture.frames
        )
    });
    if !result.is_valid {
        return result;
    }

    for (ch, original) in fixture.planar().iter().enumerate() {
        let decoded = parsed.channel(ch);
        for (i, (&sample, &got)) in original.iter().zip(decoded.iter()).enumerate() {
            let expected = quantize_sample(sample) as i32;
            if (got as i32 - expected).abs() > tolerance {
                return CheckResult::fail(format!(
                    "{}: channel {} frame {}: got {}, expected {}",
                    fixture.name, ch, i, got, expected
                ));
            }
        }
    }

    result
}

/// Encode every fixture directly and read it back
pub fn test_encode_round_trip() -> Vec<(&'static str, CheckResult)> {
    ToneFixture::all()
        .into_iter()
        .map(|fixture| {
            let result = match encode(&fixture.decoded()) {
                Ok(out) => check_wav_matches(&fixture, &out.wav, 0),
                Err(e) => CheckResult::fail(format!("encode failed: {}", e)),
            };
            (fixture.name, result)
        })
        .collect()
}

/// Decode float WAVs with FFmpeg and re-encode them as 16-bit PCM
pub fn test_ffmpeg_float_transcode() -> Vec<(&'static str, CheckResult)> {
    let decoder = FfmpegDecoder::new();
    ToneFixture::all()
        .into_iter()
        .map(|fixture| {
            let input = AudioInput::new(fixture.float_wav()).with_file_name("take.wav");
            let result = match convert(&input, &decoder, PassthroughMode::Sniff) {
                Ok(out) if out.outcome != ConversionOutcome::Transcoded => {
                    CheckResult::fail("float WAV was passed through")
                }
                Ok(out) => check_wav_matches(&fixture, &out.wav, 1),
                Err(e) => CheckResult::fail(format!("conversion failed: {}", e)),
            };
            (fixture.name, result)
        })
        .collect()
}

/// Timing summary for repeated conversions
#[derive(Debug)]
pub struct BenchmarkResult {
    pub name: String,
    pub iterations: usize,
    pub total_ms: u128,
    pub avg_ms: u128,
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} iterations, {}ms total, {}ms avg",
            self.name, self.iterations, self.total_ms, self.avg_ms
        )
    }
}

/// Time the decode-free encode path on one second of mono voice
pub fn benchmark_encode(iterations: usize) -> BenchmarkResult {
    let audio = ToneFixture::voice_mono().decoded();
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = encode(&audio);
    }
    let total_ms = start.elapsed().as_millis();
    BenchmarkResult {
        name: "encode voice_mono".to_string(),
        iterations,
        total_ms,
        avg_ms: total_ms / iterations.max(1) as u128,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn init() {
        let _ = crate::ffmpeg::init();
    }

    #[test]
    fn test_encode_round_trip_all_fixtures() {
        for (name, result) in test_encode_round_trip() {
            assert!(result.is_valid, "{} failed: {:?}", name, result.errors);
        }
    }

    #[test]
    fn test_ffmpeg_float_transcode_all_fixtures() {
        init();
        for (name, result) in test_ffmpeg_float_transcode() {
            assert!(result.is_valid, "{} failed: {:?}", name, result.errors);
        }
    }

    #[test]
    fn test_round_trip_error_within_one_step() {
        let fixture = ToneFixture::music_stereo();
        let out = encode(&fixture.decoded()).unwrap();
        let parsed = parse_wav(&out.wav);

        for (ch, original) in fixture.planar().iter().enumerate() {
            for (&x, &q) in original.iter().zip(parsed.channel(ch).iter()) {
                let scale = if q < 0 { 32768.0 } else { 32767.0 };
                assert!(
                    (q as f32 / scale - x).abs() <= 1.0 / 32767.0,
                    "sample {} decoded as {}",
                    x,
                    q
                );
            }
        }
    }

    #[test]
    fn test_clipped_fixture_saturates() {
        let out = encode(&ToneFixture::clipped_mono().decoded()).unwrap();
        let parsed = parse_wav(&out.wav);
        assert_eq!(parsed.samples.iter().max(), Some(&i16::MAX));
        assert_eq!(parsed.samples.iter().min(), Some(&i16::MIN));
    }

    #[test]
    fn test_pcm_wav_reencoded_when_passthrough_disabled() {
        init();
        let fixture = ToneFixture::voice_mono();
        let wav = fixture.pcm16_wav();
        let original = parse_wav(&wav);

        let out = convert(
            &AudioInput::new(wav.clone()),
            &FfmpegDecoder::new(),
            PassthroughMode::Never,
        )
        .unwrap();
        assert_eq!(out.outcome, ConversionOutcome::Transcoded);

        // s16 -> f32 -> s16 loses at most one step on positive samples
        let reencoded = parse_wav(&out.wav);
        assert_eq!(reencoded.spec, original.spec);
        assert_eq!(reencoded.samples.len(), original.samples.len());
        for (a, b) in original.samples.iter().zip(reencoded.samples.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 1, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_pcm_wav_passes_through_untouched() {
        let wav = ToneFixture::music_stereo().pcm16_wav();
        let out = convert(
            &AudioInput::new(wav.clone()),
            &FfmpegDecoder::new(),
            PassthroughMode::Sniff,
        )
        .unwrap();
        assert_eq!(out.outcome, ConversionOutcome::Passthrough);
        assert_eq!(out.wav, wav);
        assert_eq!(out.frames, 22050);
    }

    #[test]
    fn test_concurrent_conversions_are_independent() {
        init();
        let decoder = Arc::new(FfmpegDecoder::new());

        let handles: Vec<_> = ToneFixture::all()
            .into_iter()
            .cycle()
            .take(9)
            .map(|fixture| {
                let decoder = decoder.clone();
                std::thread::spawn(move || {
                    let input = AudioInput::new(fixture.float_wav());
                    let out = convert(&input, decoder.as_ref(), PassthroughMode::Sniff)
                        .expect("conversion failed");
                    check_wav_matches(&fixture, &out.wav, 1)
                })
            })
            .collect();

        for handle in handles {
            let result = handle.join().unwrap();
            assert!(result.is_valid, "{:?}", result.errors);
        }
    }

    #[test]
    fn test_benchmark_encode() {
        let result = benchmark_encode(20);
        println!("{}", result);
        // One second of 16 kHz mono should encode well under 50ms
        assert!(
            result.avg_ms < 50,
            "Encoding too slow: {}ms avg",
            result.avg_ms
        );
    }
}
