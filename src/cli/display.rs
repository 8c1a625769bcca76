//! Display utilities for the work/break timer CLI.
//!
//! This module provides formatted output for:
//! - Settings
//! - Today's status
//! - Round history
//! - Error messages

use std::io::{self, Write};

use crate::rounds::DailyCount;
use crate::settings::{SettingField, Settings};
use crate::types::format_time;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the current settings.
    pub fn show_settings(settings: &Settings) {
        Self::print(|out| Self::write_settings(out, settings));
    }

    /// Shows a success message after saving settings.
    pub fn show_settings_saved(settings: &Settings) {
        println!("* Settings saved");
        Self::show_settings(settings);
        println!("  A running timer picks these up from Settings... in its menu.");
    }

    /// Shows today's status.
    pub fn show_status(rounds_today: u32, settings: &Settings) {
        Self::print(|out| Self::write_status(out, rounds_today, settings));
    }

    /// Shows the last `days` entries of the round history.
    pub fn show_history(history: &[DailyCount], days: usize) {
        Self::print(|out| Self::write_history(out, history, days));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn print<F>(render: F)
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = render(&mut out) {
            tracing::debug!(error = %e, "Failed to write to stdout");
        }
    }

    fn write_settings(out: &mut dyn Write, settings: &Settings) -> io::Result<()> {
        for field in SettingField::ALL {
            writeln!(out, "  {:<28} {}", field.label(), settings.get(field))?;
        }
        Ok(())
    }

    fn write_status(out: &mut dyn Write, rounds_today: u32, settings: &Settings) -> io::Result<()> {
        let durations = settings.durations();
        writeln!(out, "Work Break Timer status")?;
        writeln!(out, "─────────────────────────────")?;
        writeln!(out, "Rounds today: {}", rounds_today)?;
        writeln!(out, "Work:         {}", format_time(durations.work_seconds))?;
        writeln!(out, "Break:        {}", format_time(durations.break_seconds))?;
        writeln!(out, "Force focus:  {}s", durations.force_focus_seconds)
    }

    fn write_history(out: &mut dyn Write, history: &[DailyCount], days: usize) -> io::Result<()> {
        if history.is_empty() {
            return writeln!(out, "No rounds recorded yet");
        }

        let start = history.len().saturating_sub(days);
        for entry in &history[start..] {
            writeln!(out, "{}  {:>3}", entry.date.format("%Y-%m-%d"), entry.count)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
