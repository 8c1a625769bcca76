//! Tray icon image and status text.
//!
//! This module handles:
//! - Rendering the tray icon bitmap (a filled circle, tinted per phase)
//! - Status text for the menu header and the console
//! - Tracking phase changes so the icon is only redrawn when needed
//!
//! Everything here is platform-independent and fully testable.

use crate::types::{format_time, TimerPhase, TimerSnapshot};

// ============================================================================
// Constants
// ============================================================================

/// Edge length of the square tray icon, in pixels.
pub const ICON_SIZE: u32 = 22;

/// RGB colour while working
const WORKING_COLOR: [u8; 3] = [0xd9, 0x48, 0x3b];

/// RGB colour while on a break
const BREAK_COLOR: [u8; 3] = [0x3b, 0x9c, 0x5a];

/// RGB colour while idle
const IDLE_COLOR: [u8; 3] = [0x80, 0x80, 0x80];

// ============================================================================
// IconManager
// ============================================================================

/// Manages the tray icon image and status text.
#[derive(Debug, Default)]
pub struct IconManager {
    /// Phase the icon was last drawn for
    last_phase: Option<TimerPhase>,
}

impl IconManager {
    /// Creates a new IconManager.
    pub fn new() -> Self {
        Self { last_phase: None }
    }

    /// Renders the tray icon for `phase` as tightly packed RGBA rows.
    ///
    /// The returned buffer holds `ICON_SIZE * ICON_SIZE * 4` bytes.
    pub fn icon_rgba(&self, phase: TimerPhase) -> Vec<u8> {
        let [r, g, b] = Self::color(phase);
        let size = ICON_SIZE as i64;
        let center = size - 1;
        // Compare in doubled coordinates so the centre falls on a pixel edge.
        let radius_sq = (size - 2) * (size - 2);

        let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = 2 * x - center;
                let dy = 2 * y - center;
                let alpha = if dx * dx + dy * dy <= radius_sq { 0xff } else { 0 };
                rgba.extend_from_slice(&[r, g, b, alpha]);
            }
        }
        rgba
    }

    /// Returns the tint used for `phase`.
    pub fn color(phase: TimerPhase) -> [u8; 3] {
        match phase {
            TimerPhase::Working => WORKING_COLOR,
            TimerPhase::Breaking => BREAK_COLOR,
            TimerPhase::Idle => IDLE_COLOR,
        }
    }

    /// Generates the status line shown at the top of the menu.
    ///
    /// Format:
    /// - Working: "Working 12:34"
    /// - Breaking: "Break 04:59"
    /// - Idle: "Stopped"
    pub fn status_text(&self, snapshot: &TimerSnapshot) -> String {
        match snapshot.phase {
            TimerPhase::Working => format!("Working {}", format_time(snapshot.remaining_seconds)),
            TimerPhase::Breaking => format!("Break {}", format_time(snapshot.remaining_seconds)),
            TimerPhase::Idle => "Stopped".to_string(),
        }
    }

    /// Checks if the phase has changed since last update.
    ///
    /// Only redraw the icon image when this returns true.
    pub fn phase_changed(&mut self, phase: TimerPhase) -> bool {
        let changed = self.last_phase != Some(phase);
        if changed {
            self.last_phase = Some(phase);
        }
        changed
    }
}

// ============================================================================
// Tests
// ============================================================================
