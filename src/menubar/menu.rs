//! Menu building and item state management for the menu bar.
//!
//! This module handles:
//! - Menu item configuration and state
//! - Determining which menu items should be enabled/disabled based on timer state
//!
//! The configuration logic is platform-independent and fully testable.
//! Actual menu creation using tray-icon is done in the platform-specific code.

use crate::notification::APP_NAME;
use crate::types::{TimerPhase, TimerSnapshot};

use super::event::{MenuAction, MenuItemId};
use super::icon::IconManager;

// ============================================================================
// MenuItemConfig
// ============================================================================

/// Configuration for a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemConfig {
    /// Native id, `None` for informational items
    pub id: Option<MenuItemId>,
    /// Display text for the menu item
    pub text: String,
    /// Whether the menu item is enabled (clickable)
    pub enabled: bool,
}

impl MenuItemConfig {
    /// Creates an informational (never clickable) item.
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            enabled: false,
        }
    }

    /// Creates an action item.
    pub fn action(id: MenuItemId, action: MenuAction, enabled: bool) -> Self {
        Self {
            id: Some(id),
            text: action.label().to_string(),
            enabled,
        }
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// Complete menu configuration based on current timer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    /// Title item (always disabled, shows app name)
    pub title: MenuItemConfig,
    /// Status line (always disabled)
    pub status: MenuItemConfig,
    /// Enable button
    pub enable: MenuItemConfig,
    /// Disable button
    pub disable: MenuItemConfig,
    /// Settings button (always enabled)
    pub settings: MenuItemConfig,
    /// Quit button (always enabled)
    pub quit: MenuItemConfig,
}

impl MenuConfig {
    /// Returns the clickable items in display order.
    pub fn actions(&self) -> [&MenuItemConfig; 4] {
        [&self.enable, &self.disable, &self.settings, &self.quit]
    }
}

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds menu configuration based on timer state.
#[derive(Debug, Default)]
pub struct MenuBuilder {
    icons: IconManager,
}

impl MenuBuilder {
    /// Creates a new MenuBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a complete menu configuration for `snapshot`.
    pub fn build(&self, snapshot: &TimerSnapshot) -> MenuConfig {
        MenuConfig {
            title: MenuItemConfig::label(APP_NAME),
            status: MenuItemConfig::label(self.icons.status_text(snapshot)),
            enable: MenuItemConfig::action(
                MenuItemId::Enable,
                MenuAction::Enable,
                Self::is_enable_enabled(snapshot.phase),
            ),
            disable: MenuItemConfig::action(
                MenuItemId::Disable,
                MenuAction::Disable,
                Self::is_disable_enabled(snapshot.phase),
            ),
            settings: MenuItemConfig::action(MenuItemId::Settings, MenuAction::Settings, true),
            quit: MenuItemConfig::action(MenuItemId::Quit, MenuAction::Quit, true),
        }
    }

    /// Enable is offered unless a work phase is already running.
    pub fn is_enable_enabled(phase: TimerPhase) -> bool {
        phase != TimerPhase::Working
    }

    /// Disable is offered while any phase is running.
    pub fn is_disable_enabled(phase: TimerPhase) -> bool {
        phase.is_active()
    }
}

// ============================================================================
// Tests
// ============================================================================
