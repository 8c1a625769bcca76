//! Completion chime playback.
//!
//! This module provides:
//!
//! - The [`SoundPlayer`] trait, whose single call blocks until a clip ends
//! - [`RodioSoundPlayer`], backed by rodio on a dedicated audio thread
//! - [`SilentSoundPlayer`] for `--no-sound`
//! - [`MockSoundPlayer`] for tests
//!
//! # Architecture
//!
//! ```text
//! timer task ── play_to_completion ──▶ RodioSoundPlayer
//!                                          │ PlayRequest
//!                                          ▼
//!                                   ┌──────────────┐
//!                                   │ audio thread │ owns OutputStream
//!                                   └──────────────┘
//! ```

mod embedded;
mod error;
mod player;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use embedded::{validate_clip, CHIME};
pub use error::SoundError;
pub use player::RodioSoundPlayer;

/// Trait for sound playback implementations.
pub trait SoundPlayer: Send + Sync {
    /// Plays `clip`, returning only after playback has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play_to_completion(&self, clip: &'static [u8]) -> Result<(), SoundError>;
}

impl SoundPlayer for RodioSoundPlayer {
    fn play_to_completion(&self, clip: &'static [u8]) -> Result<(), SoundError> {
        RodioSoundPlayer::play_to_completion(self, clip)
    }
}

/// Player that accepts every clip without touching the audio device.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSoundPlayer;

impl SoundPlayer for SilentSoundPlayer {
    fn play_to_completion(&self, _clip: &'static [u8]) -> Result<(), SoundError> {
        tracing::debug!("Sound disabled, skipping chime");
        Ok(())
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_count: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_count.load(Ordering::SeqCst)
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play_to_completion(&self, _clip: &'static [u8]) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::DecodeError("Mock failure".to_string()));
        }
        self.play_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_counts_plays() {
        let mock = MockSoundPlayer::new();
        mock.play_to_completion(CHIME).unwrap();
        mock.play_to_completion(CHIME).unwrap();
        assert_eq!(mock.play_count(), 2);
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockSoundPlayer::new();
        mock.set_should_fail(true);
        assert!(mock.play_to_completion(CHIME).is_err());
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_silent_player_always_succeeds() {
        assert!(SilentSoundPlayer.play_to_completion(CHIME).is_ok());
    }

    #[test]
    fn test_players_are_object_safe() {
        let players: Vec<Box<dyn SoundPlayer>> =
            vec![Box::new(SilentSoundPlayer), Box::new(MockSoundPlayer::new())];
        for player in &players {
            assert!(player.play_to_completion(CHIME).is_ok());
        }
    }
}
