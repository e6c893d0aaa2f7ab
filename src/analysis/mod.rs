//! Downstream voice-analysis service
//!
//! The service receives the converted WAV (and optionally the original
//! upload) as multipart fields `wav` and `original` and answers with a JSON
//! summary. Submissions are fire-and-forget from the conversion path: a
//! failure is logged and never reaches the uploader.

pub mod client;
pub mod report;

pub use client::{spawn_submit, AnalysisClient, AnalysisError, OriginalFile};
pub use report::AnalysisReport;
