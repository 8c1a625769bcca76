//! Timer daemon for the work/break timer.
//!
//! This module contains the core timer functionality:
//! - `timer`: Phase state machine with countdown and side effects
//! - `service`: Tokio task that drives the engine once per second
//! - `app`: Foreground process wiring the service to the UI

pub mod app;
pub mod service;
pub mod timer;

pub use app::{run, AppActions, RunOptions};
pub use service::{ServiceStopped, TimerCommand, TimerController, TimerHandle, TimerService};
pub use timer::{TickOutcome, TimerEngine, TimerSinks};
