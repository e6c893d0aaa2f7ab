//! Audio decoding
//!
//! [`Decoder`] is the capability the pipeline consumes: bytes in, planar
//! float PCM out. [`FfmpegDecoder`] is the production implementation; tests
//! substitute their own.

use std::io::Write;

use crate::error::{ConvertError, FfmpegError, Result};
use crate::transcode::audio::DecodedAudio;
use crate::transcode::converter::{needs_conversion, SampleConverter, TARGET_SAMPLE_FORMAT};
use ffmpeg_next as ffmpeg;

/// Turns an encoded audio file into deinterleaved float PCM
pub trait Decoder: Send + Sync {
    /// Short name for logs and `/version`
    fn name(&self) -> &'static str;

    /// Decode a complete file held in memory.
    ///
    /// Corrupt or unsupported input fails with [`ConvertError::Decode`].
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio>;
}

/// FFmpeg codec context for one audio stream
pub struct AudioDecoder {
    decoder: ffmpeg::decoder::Audio,
    stream_index: usize,
}

impl AudioDecoder {
    /// Open a decoder from the stream's own codec parameters.
    pub fn open(stream: &ffmpeg::format::stream::Stream) -> Result<Self> {
        let stream_index = stream.index();
        let context =
            ffmpeg::codec::Context::from_parameters(stream.parameters()).map_err(|e| {
                FfmpegError::DecoderCreate(format!(
                    "codec context for stream {}: {}",
                    stream_index, e
                ))
            })?;

        let decoder = context.decoder().audio().map_err(|e| {
            FfmpegError::DecoderCreate(format!(
                "audio decoder for stream {}: {}",
                stream_index, e
            ))
        })?;

        Ok(Self {
            decoder,
            stream_index,
        })
    }

    /// Send a compressed packet to the decoder.
    ///
    /// `AVERROR_INVALIDDATA` on a single packet is skipped with a debug log;
    /// a file that is entirely garbage still fails because no stream or no
    /// frames come out of it.
    pub fn send_packet(&mut self, packet: &ffmpeg::codec::packet::Packet) -> Result<()> {
        match self.decoder.send_packet(packet) {
            Ok(()) => Ok(()),
            Err(ffmpeg::Error::InvalidData) => {
                tracing::debug!(
                    stream_index = self.stream_index,
                    "send_packet: skipping invalid packet"
                );
                Ok(())
            }
            Err(e) => Err(FfmpegError::DecodePacket(format!(
                "stream {}: {}",
                self.stream_index, e
            ))
            .into()),
        }
    }

    /// Send EOF so buffered frames can be drained.
    pub fn send_eof(&mut self) -> Result<()> {
        match self.decoder.send_eof() {
            Ok(()) => Ok(()),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => Ok(()),
            Err(ffmpeg::Error::Eof) => Ok(()),
            Err(e) => Err(FfmpegError::DecodePacket(format!(
                "send_eof on stream {}: {}",
                self.stream_index, e
            ))
            .into()),
        }
    }

    /// Receive one decoded frame, or `None` if the decoder needs more input.
    pub fn receive_frame(&mut self) -> Result<Option<ffmpeg::util::frame::Audio>> {
        let mut frame = ffmpeg::util::frame::Audio::empty();
        match self.decoder.receive_frame(&mut frame) {
            Ok(()) => Ok(Some(frame)),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => Ok(None),
            Err(ffmpeg::Error::Eof) => Ok(None),
            Err(e) => Err(FfmpegError::ReadFrame(format!(
                "stream {}: {}",
                self.stream_index, e
            ))
            .into()),
        }
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    pub fn sample_rate(&self) -> u32 {
        self.decoder.rate()
    }

    pub fn channels(&self) -> u16 {
        self.decoder.channels()
    }
}

/// Samples of one plane of a planar f32 frame.
///
/// `Audio::plane` indexes the fixed eight-entry `data` array, so streams
/// with more channels are read through `extended_data`, which holds a
/// pointer for every plane.
fn plane_samples(frame: &ffmpeg::util::frame::Audio, index: usize) -> &[f32] {
    if index >= frame.planes() || frame.format() != TARGET_SAMPLE_FORMAT {
        return &[];
    }
    // SAFETY: the frame is planar f32 with `planes()` allocated planes of
    // `samples()` values each, and the slice borrows the frame.
    unsafe {
        let planes = (*frame.as_ptr()).extended_data;
        if planes.is_null() {
            return &[];
        }
        let data = *planes.add(index);
        if data.is_null() {
            return &[];
        }
        std::slice::from_raw_parts(data as *const f32, frame.samples())
    }
}

/// Collects planar f32 frames into per-channel sample vectors
struct PcmCollector {
    converter: Option<SampleConverter>,
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl PcmCollector {
    fn new() -> Self {
        Self {
            converter: None,
            channels: Vec::new(),
            sample_rate: 0,
        }
    }

    fn push(&mut self, frame: ffmpeg::util::frame::Audio) -> Result<()> {
        if frame.samples() == 0 {
            return Ok(());
        }
        if self.sample_rate == 0 {
            self.sample_rate = frame.rate();
        }

        if !needs_conversion(&frame) {
            self.append(&frame);
            return Ok(());
        }

        if self.converter.is_none() {
            self.converter = Some(SampleConverter::new(&frame)?);
        }
        if let Some(converter) = self.converter.as_mut() {
            if let Some(out) = converter.convert(&frame)? {
                self.append(&out);
            }
        }
        Ok(())
    }

    fn append(&mut self, frame: &ffmpeg::util::frame::Audio) {
        let count = frame.planes();
        if self.channels.is_empty() {
            self.channels = vec![Vec::new(); count];
        }
        for (ch, samples) in self.channels.iter_mut().enumerate().take(count) {
            samples.extend_from_slice(plane_samples(frame, ch));
        }
    }

    fn finish(mut self, fallback_rate: u32) -> Result<DecodedAudio> {
        if let Some(out) = self.converter.as_mut().and_then(|c| c.flush()) {
            self.append(&out);
        }
        if self.channels.is_empty() {
            return Err(ConvertError::Decode("no audio frames decoded".into()));
        }
        let rate = if self.sample_rate == 0 {
            fallback_rate
        } else {
            self.sample_rate
        };
        DecodedAudio::new(rate, self.channels)
    }
}

/// Decoder backed by libavformat/libavcodec
///
/// The upload is spooled to a temporary file so FFmpeg can probe and seek
/// it like any other input. The file and the format context are owned by
/// the decode call and dropped on every exit path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_file(&self, path: &std::path::Path) -> Result<DecodedAudio> {
        let mut input = ffmpeg::format::input(&path)
            .map_err(|e| FfmpegError::OpenInput(e.to_string()))?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Audio)
            .ok_or_else(|| FfmpegError::StreamNotFound(format!("{:?}", path)))?;
        let mut decoder = AudioDecoder::open(&stream)?;
        let stream_index = decoder.stream_index();
        // Release the stream borrow before iterating packets mutably
        drop(stream);

        tracing::debug!(
            stream_index,
            sample_rate = decoder.sample_rate(),
            channels = decoder.channels(),
            "Decoding audio stream"
        );

        let mut collector = PcmCollector::new();
        for (stream, packet) in input.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            while let Some(frame) = decoder.receive_frame()? {
                collector.push(frame)?;
            }
        }

        decoder.send_eof()?;
        while let Some(frame) = decoder.receive_frame()? {
            collector.push(frame)?;
        }

        collector.finish(decoder.sample_rate())
    }
}

impl Decoder for FfmpegDecoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio> {
        if bytes.is_empty() {
            return Err(ConvertError::EmptyInput);
        }

        let mut spool = tempfile::Builder::new()
            .prefix("wav-bridge-")
            .tempfile()
            .map_err(|e| ConvertError::Resource(format!("temp file: {}", e)))?;
        spool
            .write_all(bytes)
            .and_then(|_| spool.flush())
            .map_err(|e| ConvertError::Resource(format!("temp file write: {}", e)))?;

        self.decode_file(spool.path()).map_err(|e| match e {
            ConvertError::Ffmpeg(inner) => ConvertError::Decode(inner.to_string()),
            ConvertError::InvalidAudio(msg) => ConvertError::Decode(msg),
            other => other,
        })
    }
}
