//! Timer engine for the work/break timer.
//!
//! This module provides the phase state machine:
//! - State transitions (Idle → Working → Breaking → Working …)
//! - One-second countdown steps
//! - Side effects on the tray, the break window and notifications
//! - Round counting on work completion
//!
//! The engine is synchronous and owns no clock. [`TimerService`] drives it
//! once per second and plays the completion chime between phases.
//!
//! [`TimerService`]: super::service::TimerService

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::menubar::{TrayControl, WindowControl, WindowRegion};
use crate::notification::{
    break_started_content, work_started_content, NotificationContent, Notifier, APP_NAME,
};
use crate::rounds::{local_today, RoundCounter};
use crate::types::{format_time, DurationSettings, TimerPhase, TimerSnapshot};

/// Tray title shown when no work phase is counting down.
pub const IDLE_TRAY_TITLE: &str = "";

/// Text of the reminder region of the break window.
pub const BREAK_REMINDER: &str = "Time for a break!";

/// Source of "today" for the round counter.
pub type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

// ============================================================================
// TimerSinks
// ============================================================================

/// Collaborators the engine reports to.
#[derive(Clone)]
pub struct TimerSinks {
    /// Desktop notifications
    pub notifier: Arc<dyn Notifier>,
    /// Break window
    pub window: Arc<dyn WindowControl>,
    /// Tray icon text
    pub tray: Arc<dyn TrayControl>,
}

impl fmt::Debug for TimerSinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerSinks").finish_non_exhaustive()
    }
}

// ============================================================================
// TickOutcome
// ============================================================================

/// Result of advancing the engine by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is running
    Idle,
    /// The active phase counted down and is still running
    Counting {
        /// Seconds left after this tick
        remaining_seconds: u32,
    },
    /// A work phase finished; a break is pending
    WorkCompleted {
        /// Rounds completed today, including this one
        rounds_today: u32,
    },
    /// A break phase finished; a work phase is pending
    BreakCompleted,
}

impl TickOutcome {
    /// Returns true if the tick ended a phase.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            TickOutcome::WorkCompleted { .. } | TickOutcome::BreakCompleted
        )
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// The work/break phase state machine.
///
/// Exactly one phase is active at a time. After a phase completes the
/// engine sits in `Idle` with the follow-up phase pending until
/// [`start_pending`](Self::start_pending) is called; a `disable` in between
/// cancels the follow-up.
pub struct TimerEngine {
    phase: TimerPhase,
    remaining_seconds: u32,
    target_seconds: u32,
    pending: Option<TimerPhase>,
    durations: DurationSettings,
    rounds: RoundCounter,
    sinks: TimerSinks,
    today: DateSource,
}

impl TimerEngine {
    /// Creates an idle engine.
    pub fn new(durations: DurationSettings, rounds: RoundCounter, sinks: TimerSinks) -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining_seconds: 0,
            target_seconds: 0,
            pending: None,
            durations,
            rounds,
            sinks,
            today: Arc::new(local_today),
        }
    }

    /// Replaces the source of today's date.
    #[must_use]
    pub fn with_date_source(mut self, today: DateSource) -> Self {
        self.today = today;
        self
    }

    /// Returns the current phase.
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Returns the seconds left in the current phase.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Returns the duration the current phase started with.
    pub fn target_seconds(&self) -> u32 {
        self.target_seconds
    }

    /// Returns the phase that will start after the completion chime.
    pub fn pending(&self) -> Option<TimerPhase> {
        self.pending
    }

    /// Returns the durations the next phase will use.
    pub fn durations(&self) -> DurationSettings {
        self.durations
    }

    /// Returns the number of rounds completed today.
    pub fn rounds_today(&self) -> u32 {
        self.rounds.count((self.today)())
    }

    /// Returns a snapshot of the engine state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            target_seconds: self.target_seconds,
            durations: self.durations,
        }
    }

    /// Adopts new durations for subsequent phases.
    ///
    /// The running countdown keeps the target it started with.
    pub fn apply_settings(&mut self, durations: DurationSettings) {
        info!(
            work_seconds = durations.work_seconds,
            break_seconds = durations.break_seconds,
            force_focus_seconds = durations.force_focus_seconds,
            "Durations updated"
        );
        self.durations = durations;
    }

    /// Starts a work phase.
    ///
    /// Allowed from `Idle` and `Breaking`. Returns false (and does nothing)
    /// if a work phase is already running.
    pub fn start_work(&mut self) -> bool {
        if self.phase == TimerPhase::Working {
            debug!("Work phase already running");
            return false;
        }

        let round = self.rounds_today() + 1;
        self.notify(&work_started_content(round));
        self.sinks.window.hide();

        self.enter(TimerPhase::Working, self.durations.work_seconds);
        self.sinks.tray.set_title(&format_time(self.remaining_seconds));

        info!(round, seconds = self.target_seconds, "Work phase started");
        true
    }

    /// Starts a break phase.
    ///
    /// Allowed from `Idle` and `Working`. Returns false (and does nothing)
    /// if a break is already running.
    pub fn start_break(&mut self) -> bool {
        if self.phase == TimerPhase::Breaking {
            debug!("Break phase already running");
            return false;
        }

        self.clear_tray();
        self.notify(&break_started_content());

        self.enter(TimerPhase::Breaking, self.durations.break_seconds);
        self.sinks.window.set_text(WindowRegion::Reminder, BREAK_REMINDER);
        self.sinks
            .window
            .set_text(WindowRegion::Timer, &format_time(self.remaining_seconds));
        self.sinks.window.show();

        info!(seconds = self.target_seconds, "Break phase started");
        true
    }

    /// Starts the phase left pending by the last completion, if any.
    ///
    /// Returns the phase that was started.
    pub fn start_pending(&mut self) -> Option<TimerPhase> {
        match self.pending.take()? {
            TimerPhase::Working => self.start_work().then_some(TimerPhase::Working),
            TimerPhase::Breaking => self.start_break().then_some(TimerPhase::Breaking),
            TimerPhase::Idle => None,
        }
    }

    /// Stops the running phase.
    ///
    /// Returns the phase that was stopped, or `None` if nothing was running.
    /// Calling this while idle is a no-op apart from cancelling a pending
    /// follow-up phase.
    pub fn disable(&mut self) -> Option<TimerPhase> {
        if self.pending.take().is_some() {
            info!("Pending phase cancelled");
        }

        let stopped = self.phase;
        if !stopped.is_active() {
            return None;
        }

        self.clear_tray();
        if stopped == TimerPhase::Breaking {
            self.sinks.window.hide();
        }
        self.reset();

        info!(phase = %stopped, "Timer disabled");
        Some(stopped)
    }

    /// Advances the active phase by one second.
    ///
    /// The countdown never goes below zero; the tick that reaches zero
    /// completes the phase exactly once and leaves the engine idle with the
    /// next phase pending.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.phase.is_active() {
            return TickOutcome::Idle;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        let remaining = self.remaining_seconds;

        match self.phase {
            TimerPhase::Working if remaining > 0 => {
                self.sinks.tray.set_title(&format_time(remaining));
                TickOutcome::Counting {
                    remaining_seconds: remaining,
                }
            }
            TimerPhase::Breaking if remaining > 0 => {
                self.sinks
                    .window
                    .set_text(WindowRegion::Timer, &format_time(remaining));
                TickOutcome::Counting {
                    remaining_seconds: remaining,
                }
            }
            TimerPhase::Working => self.complete_work(),
            TimerPhase::Breaking => self.complete_break(),
            TimerPhase::Idle => TickOutcome::Idle,
        }
    }

    fn complete_work(&mut self) -> TickOutcome {
        self.reset();
        self.pending = Some(TimerPhase::Breaking);

        let today = (self.today)();
        let rounds_today = match self.rounds.record(today) {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to persist round counter");
                self.rounds.count(today)
            }
        };

        info!(rounds_today, "Work phase completed");
        TickOutcome::WorkCompleted { rounds_today }
    }

    fn complete_break(&mut self) -> TickOutcome {
        self.reset();
        self.pending = Some(TimerPhase::Working);
        self.sinks.window.hide();

        info!("Break phase completed");
        TickOutcome::BreakCompleted
    }

    fn enter(&mut self, phase: TimerPhase, seconds: u32) {
        self.pending = None;
        self.phase = phase;
        self.remaining_seconds = seconds;
        self.target_seconds = seconds;
    }

    fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining_seconds = 0;
        self.target_seconds = 0;
    }

    fn clear_tray(&self) {
        self.sinks.tray.set_title(IDLE_TRAY_TITLE);
        self.sinks.tray.set_tooltip(APP_NAME);
    }

    fn notify(&self, content: &NotificationContent) {
        if let Err(e) = self.sinks.notifier.notify(content) {
            warn!(
                error = %e,
                hint = e.suggestion(),
                title = %content.title,
                "Notification not delivered"
            );
        }
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("phase", &self.phase)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("target_seconds", &self.target_seconds)
            .field("pending", &self.pending)
            .field("durations", &self.durations)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
