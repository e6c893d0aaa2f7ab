use thiserror::Error;

/// Main error type for the conversion server
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] FfmpegError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Empty input")]
    EmptyInput,

    #[error("Invalid decoded audio: {0}")]
    InvalidAudio(String),

    #[error("WAV header mismatch: declared {declared} bytes, payload is {actual} bytes")]
    FormatMismatch { declared: u64, actual: u64 },

    #[error("PCM payload too large for a RIFF container: {0} bytes")]
    PayloadTooLarge(u64),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConvertError {
    /// Short label used in stats and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::Ffmpeg(_) => "ffmpeg",
            ConvertError::Io(_) => "io",
            ConvertError::Decode(_) => "decode",
            ConvertError::EmptyInput => "empty_input",
            ConvertError::InvalidAudio(_) => "invalid_audio",
            ConvertError::FormatMismatch { .. } => "format_mismatch",
            ConvertError::PayloadTooLarge(_) => "payload_too_large",
            ConvertError::Resource(_) => "resource",
            ConvertError::Config(_) => "config",
        }
    }
}

/// FFmpeg-specific errors
#[derive(Error, Debug)]
pub enum FfmpegError {
    #[error("FFmpeg initialization failed: {0}")]
    InitFailed(String),

    #[error("Failed to open input: {0}")]
    OpenInput(String),

    #[error("No audio stream found: {0}")]
    StreamNotFound(String),

    #[error("Failed to create decoder: {0}")]
    DecoderCreate(String),

    #[error("Failed to decode packet: {0}")]
    DecodePacket(String),

    #[error("Failed to read frame: {0}")]
    ReadFrame(String),

    #[error("Failed to create sample converter: {0}")]
    ConverterCreate(String),

    #[error("Sample conversion failed: {0}")]
    Convert(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ConvertError>;
