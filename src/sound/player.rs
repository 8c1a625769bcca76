//! Sound player implementation using rodio.
//!
//! rodio's output stream is not `Send`, so the stream lives on a dedicated
//! audio thread. [`RodioSoundPlayer`] forwards play requests to that thread
//! and blocks until the clip has finished.

use std::io::Cursor;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;

/// Work item for the audio thread.
struct PlayRequest {
    clip: &'static [u8],
    done: Sender<Result<(), SoundError>>,
}

/// A sound player that uses rodio for audio playback.
///
/// The player is `Send + Sync` and can be shared across threads using `Arc`.
/// Dropping the last handle stops the audio thread.
pub struct RodioSoundPlayer {
    requests: Sender<PlayRequest>,
}

impl RodioSoundPlayer {
    /// Opens the default output device on a new audio thread.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (request_tx, request_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);

        thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || run_audio_thread(request_rx, ready_tx))
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| SoundError::PlaybackError("audio thread exited during start".into()))??;

        debug!("Audio output stream initialized");
        Ok(Self {
            requests: request_tx,
        })
    }

    /// Plays `clip` and blocks until playback ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the clip cannot be decoded, a sink cannot be
    /// created, or the audio thread has stopped.
    pub fn play_to_completion(&self, clip: &'static [u8]) -> Result<(), SoundError> {
        let (done_tx, done_rx) = bounded(1);
        self.requests
            .send(PlayRequest {
                clip,
                done: done_tx,
            })
            .map_err(|_| SoundError::PlaybackError("audio thread stopped".into()))?;

        done_rx
            .recv()
            .map_err(|_| SoundError::PlaybackError("audio thread stopped".into()))?
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

fn run_audio_thread(requests: Receiver<PlayRequest>, ready: Sender<Result<(), SoundError>>) {
    // The stream must stay alive for as long as sinks are created from it.
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    for request in requests.iter() {
        let result = play_blocking(&handle, request.clip);
        if let Err(ref e) = result {
            warn!(error = %e, "Sound playback failed");
        }
        let _ = request.done.send(result);
    }

    debug!("Audio thread stopped");
}

fn play_blocking(handle: &OutputStreamHandle, clip: &'static [u8]) -> Result<(), SoundError> {
    let decoder =
        Decoder::new(Cursor::new(clip)).map_err(|e| SoundError::DecodeError(e.to_string()))?;
    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;

    sink.append(decoder);
    sink.sleep_until_end();

    debug!("Sound playback finished");
    Ok(())
}
