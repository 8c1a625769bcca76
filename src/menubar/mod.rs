//! Menu bar UI module for the work/break timer.
//!
//! This module provides:
//! - Tray icon management for the macOS menu bar
//! - The break screen, rendered on the console
//! - A dropdown menu with Enable/Disable/Settings.../Quit
//! - Event handling for menu interactions and focus loss
//!
//! # Architecture
//!
//! The module is split into platform-independent and platform-specific parts:
//!
//! - `icon.rs`: Tray icon bitmap and status text (platform-independent)
//! - `menu.rs`: Menu configuration (platform-independent)
//! - `event.rs`: Event types and handling (platform-independent)
//! - `sink.rs`: Tray and window traits used by the timer
//! - `console.rs`: Terminal break screen and typed commands
//! - `mod.rs`: UiController (tray icon is macOS only)
//!
//! # Usage
//!
//! The timer runs on tokio and reports through a [`UiBridge`], which sends
//! [`UiCommand`]s over a crossbeam channel. The [`UiController`] runs on the
//! main thread, applies those commands and turns menu clicks into calls on
//! a [`UiHandler`].
//!
//! ```ignore
//! use crossbeam_channel::unbounded;
//! use work_break_timer::menubar::{UiBridge, UiController};
//!
//! let (ui_tx, ui_rx) = unbounded();
//! let (event_tx, event_rx) = unbounded();
//! let bridge = UiBridge::new(ui_tx);
//!
//! let mut ui = UiController::new(ui_rx, event_rx, controller.subscribe(), std::io::stdout());
//! ui.initialize()?;
//! ui.run(&mut handler)?;
//! ```

pub mod console;
pub mod event;
pub mod icon;
pub mod menu;
pub mod sink;

use std::io::Write;
use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{never, Receiver};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use console::{spawn_console_input, ConsoleScreen};
pub use event::{EventHandler, MenuAction, MenuItemId, UiCommand, UiEvent, WindowRegion};
pub use icon::{IconManager, ICON_SIZE};
pub use menu::{MenuBuilder, MenuConfig, MenuItemConfig};
pub use sink::{RecordingUi, TrayControl, UiBridge, WindowControl};

use crate::settings::{SettingEdit, Settings, SettingsError};
use crate::types::TimerSnapshot;

/// How often the UI loop polls the native menu and the timer snapshot.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shown for a bare `set` line.
pub const SET_USAGE: &str = "Usage: set work=<minutes> break=<minutes> focus=<seconds>";

// ============================================================================
// UiHandler
// ============================================================================

/// Receives user input collected by the [`UiController`].
pub trait UiHandler {
    /// Handles a menu action. Returning `Break` ends the UI loop.
    fn on_action(&mut self, action: MenuAction) -> ControlFlow<()>;

    /// Handles the break window leaving the foreground.
    fn on_focus_lost(&mut self);

    /// Validates, saves and applies settings edits.
    ///
    /// # Errors
    ///
    /// Returns the validation or store error; nothing is applied then.
    fn on_settings_submit(&mut self, edits: &[SettingEdit]) -> Result<Settings, SettingsError>;
}

// ============================================================================
// UiController
// ============================================================================

/// Owns the tray icon and the break screen on the UI thread.
///
/// On macOS a native tray icon is shown in addition to the console screen.
/// On other platforms the console is the only surface.
pub struct UiController<W: Write> {
    /// Icon manager for the tray bitmap
    icon_manager: IconManager,
    /// Menu builder for menu configuration
    menu_builder: MenuBuilder,
    /// Event handler for menu clicks
    event_handler: EventHandler,
    /// Console rendering of the tray title and break window
    screen: ConsoleScreen<W>,
    /// Commands from the timer
    commands: Receiver<UiCommand>,
    /// Input from the console
    events: Receiver<UiEvent>,
    /// Latest timer state
    snapshot: watch::Receiver<TimerSnapshot>,
    /// Text of the menu status row
    menu_status: String,
    /// Whether the manager is initialized
    initialized: bool,
    /// Platform-specific tray icon instance (macOS only)
    #[cfg(target_os = "macos")]
    tray: Option<native::NativeTray>,
}

impl<W: Write> UiController<W> {
    /// Creates a new UiController.
    ///
    /// # Note
    ///
    /// On macOS, the tray icon is not created until `initialize()` is called.
    pub fn new(
        commands: Receiver<UiCommand>,
        events: Receiver<UiEvent>,
        snapshot: watch::Receiver<TimerSnapshot>,
        out: W,
    ) -> Self {
        Self {
            icon_manager: IconManager::new(),
            menu_builder: MenuBuilder::new(),
            event_handler: EventHandler::new(),
            screen: ConsoleScreen::new(out),
            commands,
            events,
            snapshot,
            menu_status: String::new(),
            initialized: false,
            #[cfg(target_os = "macos")]
            tray: None,
        }
    }

    /// Returns whether the manager is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the console screen.
    pub fn screen(&self) -> &ConsoleScreen<W> {
        &self.screen
    }

    /// Consumes the controller, returning the console screen.
    pub fn into_screen(self) -> ConsoleScreen<W> {
        self.screen
    }

    /// Returns the status row text as of the last menu refresh.
    pub fn menu_status(&self) -> &str {
        &self.menu_status
    }

    /// Generates the menu configuration for the latest snapshot.
    pub fn generate_menu_config(&self) -> MenuConfig {
        self.menu_builder.build(&self.snapshot.borrow())
    }

    /// Initializes the tray icon (macOS only).
    ///
    /// This must be called from the main thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the tray icon cannot be created.
    #[cfg(target_os = "macos")]
    pub fn initialize(&mut self) -> Result<()> {
        let phase = self.snapshot.borrow().phase;
        self.icon_manager.phase_changed(phase);
        let rgba = self.icon_manager.icon_rgba(phase);
        let config = self.generate_menu_config();
        self.menu_status = config.status.text.clone();

        self.tray = Some(native::NativeTray::new(&config, rgba)?);
        self.initialized = true;

        info!("Tray icon initialized");
        Ok(())
    }

    /// Initializes the tray icon (non-macOS, no-op).
    #[cfg(not(target_os = "macos"))]
    pub fn initialize(&mut self) -> Result<()> {
        debug!("Tray icon is only available on macOS, using the console");
        self.initialized = true;
        Ok(())
    }

    /// Runs the UI loop until Quit, a `Shutdown` command, or the timer
    /// service going away.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be written.
    pub fn run<H: UiHandler>(&mut self, handler: &mut H) -> Result<()> {
        loop {
            let commands = self.commands.clone();
            let events = self.events.clone();

            crossbeam_channel::select! {
                recv(commands) -> msg => match msg {
                    Ok(UiCommand::Shutdown) | Err(_) => {
                        self.shutdown()?;
                        return Ok(());
                    }
                    Ok(command) => self.apply(&command)?,
                },
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        if self.dispatch(event, handler).is_break() {
                            self.shutdown()?;
                            return Ok(());
                        }
                    }
                    Err(_) => {
                        debug!("Console input closed");
                        self.events = never();
                    }
                },
                default(POLL_INTERVAL) => {}
            }

            #[cfg(target_os = "macos")]
            for id in native::pending_menu_clicks() {
                if self.dispatch(UiEvent::Menu(id), handler).is_break() {
                    self.shutdown()?;
                    return Ok(());
                }
            }

            if self.refresh_menu().is_break() {
                warn!("Timer service stopped, closing the UI");
                self.shutdown()?;
                return Ok(());
            }
        }
    }

    /// Applies every command already queued, without blocking.
    ///
    /// Returns the number of commands applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be written.
    pub fn process_pending_commands(&mut self) -> Result<usize> {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_recv() {
            self.apply(&command)?;
            applied += 1;
        }
        Ok(applied)
    }

    fn dispatch<H: UiHandler>(&mut self, event: UiEvent, handler: &mut H) -> ControlFlow<()> {
        match event {
            UiEvent::Menu(id) => match self.event_handler.handle_click(id) {
                Some(action) => handler.on_action(action),
                None => ControlFlow::Continue(()),
            },
            UiEvent::FocusLost => {
                if self.screen.is_visible() {
                    handler.on_focus_lost();
                }
                ControlFlow::Continue(())
            }
            UiEvent::SubmitSettings(edits) => {
                let message = if edits.is_empty() {
                    SET_USAGE.to_string()
                } else {
                    match handler.on_settings_submit(&edits) {
                        Ok(settings) => format!(
                            "Settings saved: work {}m, break {}m, focus {}s",
                            settings.work_minutes,
                            settings.break_minutes,
                            settings.force_focus_seconds
                        ),
                        Err(e) => format!("Error: {e}"),
                    }
                };
                if let Err(e) = self.screen.show_message(&message) {
                    warn!(error = %e, "Cannot write to the console");
                }
                ControlFlow::Continue(())
            }
        }
    }

    fn apply(&mut self, command: &UiCommand) -> Result<()> {
        #[cfg(target_os = "macos")]
        if let Some(ref tray) = self.tray {
            tray.apply(command);
        }
        self.screen.apply(command)?;
        Ok(())
    }

    /// Updates the status row on every new snapshot, and item states and
    /// the icon after a phase change.
    ///
    /// Breaks once the timer service has dropped its snapshot sender.
    fn refresh_menu(&mut self) -> ControlFlow<()> {
        match self.snapshot.has_changed() {
            Ok(true) => {}
            Ok(false) => return ControlFlow::Continue(()),
            Err(_) => return ControlFlow::Break(()),
        }

        let snapshot = *self.snapshot.borrow_and_update();
        let config = self.menu_builder.build(&snapshot);
        let phase_changed = self.icon_manager.phase_changed(snapshot.phase);

        #[cfg(target_os = "macos")]
        if let Some(ref tray) = self.tray {
            tray.set_status(&config.status.text);
            if phase_changed {
                tray.refresh(&config, self.icon_manager.icon_rgba(snapshot.phase));
            }
        }
        if phase_changed {
            debug!(phase = %snapshot.phase, "Menu refreshed for new phase");
        }

        self.menu_status = config.status.text;
        ControlFlow::Continue(())
    }

    /// Shuts down the tray icon.
    fn shutdown(&mut self) -> Result<()> {
        info!("Closing the UI");
        self.initialized = false;
        #[cfg(target_os = "macos")]
        {
            self.tray = None;
        }
        self.screen.apply(&UiCommand::Shutdown)?;
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for UiController<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiController")
            .field("initialized", &self.initialized)
            .field("icon_manager", &self.icon_manager)
            .field("menu_builder", &self.menu_builder)
            .field("event_handler", &self.event_handler)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Native tray (macOS)
// ============================================================================

#[cfg(target_os = "macos")]
mod native {
    use anyhow::{Context, Result};
    use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

    use super::event::{MenuItemId, UiCommand};
    use super::icon::ICON_SIZE;
    use super::menu::{MenuConfig, MenuItemConfig};
    use crate::notification::APP_NAME;

    /// Tray icon with handles to the items whose state changes.
    pub(super) struct NativeTray {
        icon: TrayIcon,
        status: MenuItem,
        enable: MenuItem,
        disable: MenuItem,
    }

    impl NativeTray {
        pub(super) fn new(config: &MenuConfig, rgba: Vec<u8>) -> Result<Self> {
            let menu = Menu::new();

            menu.append(&MenuItem::new(&config.title.text, false, None))?;
            let status = MenuItem::new(&config.status.text, false, None);
            menu.append(&status)?;
            menu.append(&PredefinedMenuItem::separator())?;

            let enable = native_item(&config.enable);
            let disable = native_item(&config.disable);
            menu.append(&enable)?;
            menu.append(&disable)?;
            menu.append(&native_item(&config.settings))?;
            menu.append(&PredefinedMenuItem::separator())?;
            menu.append(&native_item(&config.quit))?;

            let icon = TrayIconBuilder::new()
                .with_icon(Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE)?)
                .with_menu(Box::new(menu))
                .with_tooltip(APP_NAME)
                .build()
                .context("Failed to create tray icon")?;

            Ok(Self {
                icon,
                status,
                enable,
                disable,
            })
        }

        pub(super) fn apply(&self, command: &UiCommand) {
            let result = match command {
                UiCommand::SetTitle(title) => {
                    self.icon.set_title(Some(title));
                    Ok(())
                }
                UiCommand::SetTooltip(tooltip) => self.icon.set_tooltip(Some(tooltip)),
                _ => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to update tray icon");
            }
        }

        pub(super) fn set_status(&self, text: &str) {
            self.status.set_text(text);
        }

        pub(super) fn refresh(&self, config: &MenuConfig, rgba: Vec<u8>) {
            self.enable.set_enabled(config.enable.enabled);
            self.disable.set_enabled(config.disable.enabled);
            match Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE) {
                Ok(icon) => {
                    if let Err(e) = self.icon.set_icon(Some(icon)) {
                        tracing::warn!(error = %e, "Failed to update tray icon");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Invalid tray icon bitmap"),
            }
        }
    }

    fn native_item(config: &MenuItemConfig) -> MenuItem {
        let id = config.id.unwrap_or(MenuItemId::Unknown);
        MenuItem::with_id(id.as_str(), &config.text, config.enabled, None)
    }

    /// Drains menu clicks queued by the native menu.
    pub(super) fn pending_menu_clicks() -> Vec<MenuItemId> {
        MenuEvent::receiver()
            .try_iter()
            .map(|event| MenuItemId::parse(event.id.0.as_str()))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
