//! Events flowing between the timer, the tray menu and the UI thread.
//!
//! This module handles:
//! - Menu actions and their item identifiers
//! - Commands sent from the timer to the UI thread
//! - Input events raised by the UI host (menu clicks, focus loss)
//!
//! Everything here is platform-independent.

use std::fmt;

use crate::settings::SettingEdit;

// ============================================================================
// MenuAction
// ============================================================================

/// Actions that can be triggered from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start a work phase
    Enable,
    /// Stop whatever phase is running
    Disable,
    /// Reload settings from the preference store and apply them
    Settings,
    /// Stop the timer and exit
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_command())
    }
}

impl MenuAction {
    /// Returns the console command name for this action.
    pub fn as_command(&self) -> &'static str {
        match self {
            MenuAction::Enable => "enable",
            MenuAction::Disable => "disable",
            MenuAction::Settings => "settings",
            MenuAction::Quit => "quit",
        }
    }

    /// Returns the menu label for this action.
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Enable => "Enable",
            MenuAction::Disable => "Disable",
            MenuAction::Settings => "Settings...",
            MenuAction::Quit => "Quit",
        }
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Identifiers for menu items.
///
/// On macOS these are used as the native menu item ids; on the console
/// they are parsed from typed commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    /// Enable menu item
    Enable,
    /// Disable menu item
    Disable,
    /// Settings menu item
    Settings,
    /// Quit menu item
    Quit,
    /// Unknown or unhandled menu item
    Unknown,
}

impl MenuItemId {
    /// Converts a menu item ID to the corresponding action.
    pub fn to_action(&self) -> Option<MenuAction> {
        match self {
            MenuItemId::Enable => Some(MenuAction::Enable),
            MenuItemId::Disable => Some(MenuAction::Disable),
            MenuItemId::Settings => Some(MenuAction::Settings),
            MenuItemId::Quit => Some(MenuAction::Quit),
            MenuItemId::Unknown => None,
        }
    }

    /// Returns the stable string id used for native menu items.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemId::Enable => "enable",
            MenuItemId::Disable => "disable",
            MenuItemId::Settings => "settings",
            MenuItemId::Quit => "quit",
            MenuItemId::Unknown => "unknown",
        }
    }

    /// Parses a native id or a console command (case-insensitive).
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "enable" | "start" => MenuItemId::Enable,
            "disable" | "stop" => MenuItemId::Disable,
            "settings" | "reload" => MenuItemId::Settings,
            "quit" | "exit" => MenuItemId::Quit,
            _ => MenuItemId::Unknown,
        }
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// Converts menu clicks into actions.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    /// Creates a new EventHandler.
    pub fn new() -> Self {
        Self
    }

    /// Processes a menu item click and returns the corresponding action.
    pub fn handle_click(&self, item_id: MenuItemId) -> Option<MenuAction> {
        let action = item_id.to_action();

        match action {
            Some(ref action) => tracing::info!(action = %action, "Menu action received"),
            None => tracing::debug!(item = item_id.as_str(), "Ignoring unknown menu item"),
        }

        action
    }
}

// ============================================================================
// UiCommand
// ============================================================================

/// Regions of the break window whose text can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRegion {
    /// The "Time for a break!" line
    Reminder,
    /// The break countdown
    Timer,
}

/// Commands sent from the timer to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Update the text displayed next to the tray icon
    SetTitle(String),
    /// Update the tray tooltip
    SetTooltip(String),
    /// Show the break window
    ShowWindow,
    /// Hide the break window
    HideWindow,
    /// Bring the break window to the foreground
    RequestFocus,
    /// Replace the text of a window region
    SetWindowText {
        /// Region to update
        region: WindowRegion,
        /// New text
        text: String,
    },
    /// Tear down the tray and exit the UI loop
    Shutdown,
}

// ============================================================================
// UiEvent
// ============================================================================

/// Input raised by the UI host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A menu item (or typed console command) was activated
    Menu(MenuItemId),
    /// The break window left the foreground
    FocusLost,
    /// Settings typed as `set work=<m> break=<m> focus=<s>`
    SubmitSettings(Vec<SettingEdit>),
}

impl UiEvent {
    /// Parses one console line.
    ///
    /// An empty line dismisses the break screen, which counts as focus loss.
    pub fn from_console_line(line: &str) -> Self {
        let mut words = line.split_whitespace();
        match words.next() {
            None => UiEvent::FocusLost,
            Some(word) if word.eq_ignore_ascii_case("set") => {
                UiEvent::SubmitSettings(words.map(SettingEdit::parse).collect())
            }
            Some(_) => UiEvent::Menu(MenuItemId::parse(line)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
