//! Channel interleaving
//!
//! Turns per-channel arrays into one frame-major buffer:
//! `[f0c0, f0c1, .., f1c0, f1c1, ..]`.

/// Interleave equal-length channel arrays.
///
/// # Panics
/// Panics if the channels differ in length. Callers build their input from
/// [`DecodedAudio`](super::audio::DecodedAudio), which already guarantees this.
pub fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };
    let frames = first.len();
    assert!(
        channels.iter().all(|ch| ch.len() == frames),
        "interleave: channel arrays differ in length"
    );

    if channels.len() == 1 {
        return first.clone();
    }

    let mut out = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        for ch in channels {
            out.push(ch[i]);
        }
    }
    out
}
