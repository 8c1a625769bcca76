//! Command definitions for the work/break timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::settings::{SettingField, SettingsForm};

/// Environment variable overriding the preference file location.
pub const PREFS_ENV: &str = "WORK_BREAK_TIMER_PREFS";

// ============================================================================
// CLI Structure
// ============================================================================

/// Work/break timer that reminds you to step away from the screen
#[derive(Parser, Debug)]
#[command(
    name = "work-break-timer",
    version,
    about = "Alternating work/break timer with tray, notifications and break screen",
    long_about = "Counts down a work phase, chimes, then shows a break screen for the\n\
                  break phase, and loops until disabled. Completed work rounds are\n\
                  counted per day.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Preference file to use instead of the platform default
    #[arg(long, global = true, env = PREFS_ENV, value_name = "PATH")]
    pub prefs: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer in the foreground (starts a work phase immediately)
    Run(RunArgs),

    /// Show today's completed rounds and the configured durations
    Status,

    /// Show completed rounds per day
    History(HistoryArgs),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Disable the completion chime
    #[arg(long)]
    pub no_sound: bool,
}

// ============================================================================
// History Command Arguments
// ============================================================================

/// Arguments for the history command
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Number of most recent days to show
    #[arg(
        short,
        long,
        default_value = "7",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub days: u32,
}

// ============================================================================
// Settings Subcommands
// ============================================================================

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Validate and save new settings (omitted values are kept)
    Set(SetArgs),
}

/// Arguments for `settings set`
///
/// Values are taken as typed and validated by the settings form, so a bad
/// value is reported like any other settings error.
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Work phase length in minutes (0-999)
    #[arg(short, long, allow_hyphen_values = true)]
    pub work: Option<String>,

    /// Break phase length in minutes (0-999)
    #[arg(short, long = "break", allow_hyphen_values = true)]
    pub break_minutes: Option<String>,

    /// Seconds before the break screen grabs focus back (0-999)
    #[arg(short, long, allow_hyphen_values = true)]
    pub focus: Option<String>,
}

impl SetArgs {
    /// Returns true if no value was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none() && self.break_minutes.is_none() && self.focus.is_none()
    }

    /// Copies the given values into `form`, leaving the others untouched.
    pub fn fill(&self, form: &mut SettingsForm) {
        let given = [
            (SettingField::WorkMinutes, &self.work),
            (SettingField::BreakMinutes, &self.break_minutes),
            (SettingField::ForceFocusSeconds, &self.focus),
        ];
        for (field, value) in given {
            if let Some(input) = value {
                form.set(field, input.as_str());
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
