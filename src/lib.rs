//! Work Break Timer Library
//!
//! This library provides the core functionality for the work/break timer.
//! It includes:
//! - Timer engine alternating work and break phases
//! - Timer service driving the engine on tokio
//! - CLI command parsing and display utilities
//! - Preference store, settings model and daily round counter
//! - Desktop notifications
//! - Menu bar UI with tray icon (macOS) and console break screen
//! - Completion chime playback
//! - Break window focus enforcement

pub mod cli;
pub mod daemon;
pub mod focus;
pub mod menubar;
pub mod notification;
pub mod prefs;
pub mod rounds;
pub mod settings;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{format_time, DurationSettings, TimerPhase, TimerSnapshot};

// Re-export timer types
pub use daemon::{
    TickOutcome, TimerCommand, TimerController, TimerEngine, TimerHandle, TimerService,
    TimerSinks,
};

// Re-export storage and settings types
pub use prefs::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore};
pub use rounds::{DailyCount, RoundCounter};
pub use settings::{SettingEdit, SettingField, Settings, SettingsError, SettingsForm};

// Re-export notification types
pub use notification::{
    DesktopNotifier, MockNotifier, NotificationContent, NotificationError, Notifier,
};

// Re-export menubar types
pub use menubar::{
    EventHandler, IconManager, MenuAction, MenuBuilder, MenuConfig, MenuItemConfig, MenuItemId,
    RecordingUi, TrayControl, UiBridge, UiCommand, UiController, UiEvent, WindowControl,
};

// Re-export sound types
pub use sound::{MockSoundPlayer, RodioSoundPlayer, SilentSoundPlayer, SoundError, SoundPlayer};

// Re-export focus types
pub use focus::FocusEnforcer;
