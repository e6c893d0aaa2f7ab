//! Sample-format converter for decoded frames
//!
//! Decoders hand back whatever sample format their codec uses (S16, S32,
//! FLT, DBL, packed or planar). The encoder stages want planar `f32`, so
//! frames in any other format go through FFmpeg's `SwrContext` configured
//! with the *same* rate and channel layout on both sides: only the sample
//! representation changes, never the timing or the channel mix.

use crate::error::{FfmpegError, Result};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;

/// Sample format the interleaver consumes
pub const TARGET_SAMPLE_FORMAT: Sample = Sample::F32(ffmpeg::util::format::sample::Type::Planar);

/// Sample-format converter wrapping FFmpeg's `SwrContext`
pub struct SampleConverter {
    context: resampling::Context,
}

impl SampleConverter {
    /// Create a converter for frames shaped like `src_frame`.
    pub fn new(src_frame: &ffmpeg::util::frame::Audio) -> Result<Self> {
        let layout = frame_layout(src_frame);
        let rate = src_frame.rate();

        let context = resampling::Context::get(
            src_frame.format(),
            layout,
            rate,
            TARGET_SAMPLE_FORMAT,
            layout,
            rate,
        )
        .map_err(|e| {
            FfmpegError::ConverterCreate(format!(
                "{:?} -> {:?} at {} Hz: {}",
                src_frame.format(),
                TARGET_SAMPLE_FORMAT,
                rate,
                e
            ))
        })?;

        Ok(Self { context })
    }

    /// Convert one decoded frame to planar f32.
    ///
    /// Returns `None` when the context produced no output for this input.
    pub fn convert(
        &mut self,
        frame: &ffmpeg::util::frame::Audio,
    ) -> Result<Option<ffmpeg::util::frame::Audio>> {
        // Output frame must be empty: swr_convert_frame allocates it from the
        // context configuration.
        let mut out = ffmpeg::util::frame::Audio::empty();

        self.context
            .run(frame, &mut out)
            .map_err(|e| FfmpegError::Convert(e.to_string()))?;

        if out.samples() == 0 {
            return Ok(None);
        }
        Ok(Some(out))
    }

    /// Drain any samples still held by the context.
    ///
    /// Same-rate conversion normally buffers nothing, in which case FFmpeg
    /// reports an error that is not worth surfacing.
    pub fn flush(&mut self) -> Option<ffmpeg::util::frame::Audio> {
        let mut out = ffmpeg::util::frame::Audio::empty();
        if let Err(e) = self.context.flush(&mut out) {
            tracing::debug!("Sample converter flush returned non-fatal error: {}", e);
            return None;
        }
        if out.samples() == 0 {
            return None;
        }
        Some(out)
    }
}

/// Channel layout of a frame, derived from its channel count when unset.
fn frame_layout(frame: &ffmpeg::util::frame::Audio) -> ChannelLayout {
    if frame.channel_layout().bits() == 0 {
        ChannelLayout::default(frame.channels() as i32)
    } else {
        frame.channel_layout()
    }
}

/// Whether a frame must go through the converter before its planes can be
/// read as `f32`.
pub fn needs_conversion(frame: &ffmpeg::util::frame::Audio) -> bool {
    frame.format() != TARGET_SAMPLE_FORMAT
}
