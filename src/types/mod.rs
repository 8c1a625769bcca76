//! Core data types for the work/break timer.
//!
//! This module defines the data structures used for:
//! - Timer phase tracking
//! - Live phase durations
//! - Snapshots published by the timer service
//! - `MM:SS` formatting

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerPhase
// ============================================================================

/// Represents the current phase of the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No phase is running (initial state, and the state after Disable)
    #[default]
    Idle,
    /// Currently in a work phase
    Working,
    /// Currently in a break phase
    Breaking,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Working => "working",
            TimerPhase::Breaking => "breaking",
        }
    }

    /// Returns true if a phase loop is counting down.
    pub fn is_active(&self) -> bool {
        matches!(self, TimerPhase::Working | TimerPhase::Breaking)
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DurationSettings
// ============================================================================

/// Phase durations used by the timer, in seconds.
///
/// A phase reads these once when it starts; changing them later only
/// affects the next phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSettings {
    /// Length of a work phase
    pub work_seconds: u32,
    /// Length of a break phase
    pub break_seconds: u32,
    /// Delay before the break window grabs focus back
    pub force_focus_seconds: u32,
}

impl Default for DurationSettings {
    fn default() -> Self {
        Self {
            work_seconds: 25 * 60,
            break_seconds: 5 * 60,
            force_focus_seconds: 60,
        }
    }
}

impl DurationSettings {
    /// Creates durations from raw second counts.
    pub fn new(work_seconds: u32, break_seconds: u32, force_focus_seconds: u32) -> Self {
        Self {
            work_seconds,
            break_seconds,
            force_focus_seconds,
        }
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Point-in-time view of the timer, published after every state change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Current phase
    pub phase: TimerPhase,
    /// Seconds left in the current phase
    pub remaining_seconds: u32,
    /// Duration the current phase started with
    pub target_seconds: u32,
    /// Durations the next phase will use
    pub durations: DurationSettings,
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats a number of seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so values of an hour or more keep
/// growing the minute field.
///
/// ```
/// use work_break_timer::types::format_time;
///
/// assert_eq!(format_time(65), "01:05");
/// ```
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// Tests
// ============================================================================
