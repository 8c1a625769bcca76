//! Embedded completion chime.
//!
//! The chime is compiled into the binary so playback never depends on
//! files being present at runtime.

use std::io::Cursor;

use rodio::Decoder;

use super::error::SoundError;

/// The completion chime (16-bit PCM mono WAV, 22.05kHz, ~0.6s).
pub const CHIME: &[u8] = include_bytes!("../../assets/notification.wav");

/// Checks that `clip` can be decoded.
///
/// # Errors
///
/// Returns `SoundError::DecodeError` if rodio cannot read the clip.
pub fn validate_clip(clip: &'static [u8]) -> Result<(), SoundError> {
    Decoder::new(Cursor::new(clip))
        .map(|_| ())
        .map_err(|e| SoundError::DecodeError(e.to_string()))
}
