//! FFmpeg module - library initialisation and global settings

pub use ffmpeg_next as ffmpeg;

/// Initialize FFmpeg library
///
/// This should be called once at application startup.
/// Returns an error if FFmpeg fails to initialize.
pub fn init() -> Result<(), crate::error::FfmpegError> {
    ffmpeg::init().map_err(|e| {
        crate::error::FfmpegError::InitFailed(format!("ffmpeg::init() failed: {}", e))
    })?;

    tracing::info!("FFmpeg initialized");

    Ok(())
}

/// Restrict libav* logging to warnings and errors.
///
/// Called once at startup; the level is process-global, so setting it per
/// conversion would race between concurrent requests.
pub fn quiet_library_logs() {
    unsafe {
        ffmpeg::ffi::av_log_set_level(ffmpeg::ffi::AV_LOG_WARNING as i32);
    }
}

/// Get FFmpeg version information
pub fn version_info() -> String {
    let version = unsafe { ffmpeg::ffi::avformat_version() };
    format!(
        "libavformat {}.{}.{}",
        version >> 16,
        (version >> 8) & 0xff,
        version & 0xff
    )
}
