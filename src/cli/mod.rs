//! CLI module for the work/break timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, HistoryArgs, RunArgs, SetArgs, SettingsCommand, PREFS_ENV};
pub use display::Display;
