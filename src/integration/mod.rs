//! Integration tests
//!
//! These run the real FFmpeg decoder and the full conversion path on
//! synthetic audio, and read the results back with an independent WAV
//! parser.

pub mod e2e;
pub mod fixtures;
