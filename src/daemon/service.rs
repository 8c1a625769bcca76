//! Timer service task.
//!
//! The service owns the [`TimerEngine`] on a tokio task and drives it once
//! per second. Everything else talks to it through a [`TimerController`]:
//!
//! ```text
//! UI thread ── TimerCommand ──▶ TimerService ── TimerSnapshot ──▶ watchers
//!                                   │
//!                                   └── spawn_blocking(chime)
//! ```
//!
//! Commands are always handled before a pending tick, and commands that
//! arrive while the completion chime plays are applied before the next
//! phase starts. A `Disable` sent during the chime therefore cancels the
//! follow-up phase.

use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::sound::{SoundPlayer, CHIME};
use crate::types::{DurationSettings, TimerSnapshot};

use super::timer::TimerEngine;

/// Length of one countdown step.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// TimerCommand
// ============================================================================

/// Requests accepted by the timer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Start a work phase
    Enable,
    /// Stop the running phase and play the chime
    Disable,
    /// Use new durations from the next phase on
    ApplySettings(DurationSettings),
    /// Stop the service task
    Shutdown,
}

/// Returned when a command is sent after the service has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timer service is not running")]
pub struct ServiceStopped;

// ============================================================================
// TimerController
// ============================================================================

/// Cloneable handle for sending commands and reading timer state.
#[derive(Debug, Clone)]
pub struct TimerController {
    commands: mpsc::UnboundedSender<TimerCommand>,
    snapshot: watch::Receiver<TimerSnapshot>,
}

impl TimerController {
    /// Starts a work phase.
    pub fn enable(&self) -> Result<(), ServiceStopped> {
        self.send(TimerCommand::Enable)
    }

    /// Stops the running phase.
    pub fn disable(&self) -> Result<(), ServiceStopped> {
        self.send(TimerCommand::Disable)
    }

    /// Applies new durations to subsequent phases.
    pub fn apply_settings(&self, durations: DurationSettings) -> Result<(), ServiceStopped> {
        self.send(TimerCommand::ApplySettings(durations))
    }

    /// Returns the most recently published snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        *self.snapshot.borrow()
    }

    /// Returns a receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot.clone()
    }

    fn send(&self, command: TimerCommand) -> Result<(), ServiceStopped> {
        debug!(?command, "Sending timer command");
        self.commands.send(command).map_err(|_| ServiceStopped)
    }
}

// ============================================================================
// TimerHandle
// ============================================================================

/// Owner handle of a spawned [`TimerService`].
#[derive(Debug)]
pub struct TimerHandle {
    controller: TimerController,
    task: JoinHandle<Result<()>>,
}

impl TimerHandle {
    /// Returns a controller for this service.
    pub fn controller(&self) -> TimerController {
        self.controller.clone()
    }

    /// Returns true once the service task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the service and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the service, if it failed on its own.
    pub async fn shutdown(self) -> Result<()> {
        // The task may already be gone after a fatal error.
        let _ = self.controller.send(TimerCommand::Shutdown);
        self.task.await.context("Timer task panicked")?
    }
}

// ============================================================================
// TimerService
// ============================================================================

/// Tokio task that owns and drives a [`TimerEngine`].
pub struct TimerService {
    engine: TimerEngine,
    sound: Arc<dyn SoundPlayer>,
    clip: &'static [u8],
    commands: mpsc::UnboundedReceiver<TimerCommand>,
    snapshot: watch::Sender<TimerSnapshot>,
}

impl TimerService {
    /// Creates a service and the controller that talks to it.
    ///
    /// `clip` is played each time a phase completes or is stopped.
    pub fn new(
        engine: TimerEngine,
        sound: Arc<dyn SoundPlayer>,
        clip: &'static [u8],
    ) -> (Self, TimerController) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        let service = Self {
            engine,
            sound,
            clip,
            commands: command_rx,
            snapshot: snapshot_tx,
        };
        let controller = TimerController {
            commands: command_tx,
            snapshot: snapshot_rx,
        };
        (service, controller)
    }

    /// Spawns a service playing the embedded chime onto the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(engine: TimerEngine, sound: Arc<dyn SoundPlayer>) -> TimerHandle {
        Self::spawn_with_clip(engine, sound, CHIME)
    }

    /// Like [`spawn`](Self::spawn), with a custom completion clip.
    pub fn spawn_with_clip(
        engine: TimerEngine,
        sound: Arc<dyn SoundPlayer>,
        clip: &'static [u8],
    ) -> TimerHandle {
        let (service, controller) = Self::new(engine, sound, clip);
        let task = tokio::spawn(async move {
            let result = service.run().await;
            if let Err(ref e) = result {
                error!(error = %format!("{:#}", e), "Timer service stopped");
            }
            result
        });
        TimerHandle { controller, task }
    }

    /// Runs the service until `Shutdown` or until every controller is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion chime cannot be played.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = new_ticker();

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("All controllers dropped");
                        break;
                    };
                    match self.handle(command).await? {
                        Handled::Stop => break,
                        // A fresh phase gets a full first second.
                        Handled::PhaseStarted => ticker.reset(),
                        Handled::Continue => {}
                    }
                }
                _ = ticker.tick() => {
                    if self.engine.tick().is_completion() {
                        self.publish();
                        if self.finish_phase().await?.is_break() {
                            break;
                        }
                        ticker.reset();
                    }
                }
            }

            self.publish();
        }

        info!("Timer service stopped");
        Ok(())
    }

    /// Plays the chime, applies commands that arrived meanwhile and starts
    /// the pending phase.
    async fn finish_phase(&mut self) -> Result<ControlFlow<()>> {
        self.play_chime().await?;

        while let Ok(command) = self.commands.try_recv() {
            if self.handle(command).await? == Handled::Stop {
                return Ok(ControlFlow::Break(()));
            }
        }

        if let Some(phase) = self.engine.start_pending() {
            debug!(%phase, "Next phase started");
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Blocks a pool thread until the chime has played.
    async fn play_chime(&self) -> Result<()> {
        let sound = Arc::clone(&self.sound);
        let clip = self.clip;
        tokio::task::spawn_blocking(move || sound.play_to_completion(clip))
            .await
            .context("Chime task panicked")?
            .context("Failed to play completion chime")
    }

    async fn handle(&mut self, command: TimerCommand) -> Result<Handled> {
        match command {
            TimerCommand::Enable => {
                if self.engine.start_work() {
                    return Ok(Handled::PhaseStarted);
                }
            }
            TimerCommand::Disable => {
                // Stopping a running phase sounds the chime; a pending one is
                // cancelled silently.
                if self.engine.disable().is_some() {
                    self.publish();
                    self.play_chime().await?;
                }
            }
            TimerCommand::ApplySettings(durations) => self.engine.apply_settings(durations),
            TimerCommand::Shutdown => {
                self.engine.disable();
                return Ok(Handled::Stop);
            }
        }
        Ok(Handled::Continue)
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.engine.snapshot());
    }
}

/// What the run loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handled {
    Continue,
    PhaseStarted,
    Stop,
}

fn new_ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

// ============================================================================
// Tests
// ============================================================================
