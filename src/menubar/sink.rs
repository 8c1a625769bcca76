//! Tray and window control surfaces used by the timer.
//!
//! The timer runs off the UI thread, so it never touches the tray or the
//! break screen directly. [`UiBridge`] implements both traits by sending
//! [`UiCommand`]s over a crossbeam channel to the UI thread.

use std::sync::Mutex;

use crossbeam_channel::Sender;

use super::event::{UiCommand, WindowRegion};

/// Control over the tray icon text.
pub trait TrayControl: Send + Sync {
    /// Sets the text shown next to the tray icon.
    fn set_title(&self, title: &str);

    /// Sets the tray icon tooltip.
    fn set_tooltip(&self, tooltip: &str);
}

/// Control over the break window.
pub trait WindowControl: Send + Sync {
    /// Makes the window visible.
    fn show(&self);

    /// Hides the window.
    fn hide(&self);

    /// Brings the window to the foreground.
    fn request_focus(&self);

    /// Replaces the text of one region of the window.
    fn set_text(&self, region: WindowRegion, text: &str);
}

// ============================================================================
// UiBridge
// ============================================================================

/// Forwards tray and window calls to the UI thread.
#[derive(Debug, Clone)]
pub struct UiBridge {
    tx: Sender<UiCommand>,
}

impl UiBridge {
    /// Creates a bridge sending on `tx`.
    pub fn new(tx: Sender<UiCommand>) -> Self {
        Self { tx }
    }

    fn send(&self, command: UiCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("UI channel closed, dropping command");
        }
    }
}

impl TrayControl for UiBridge {
    fn set_title(&self, title: &str) {
        self.send(UiCommand::SetTitle(title.to_string()));
    }

    fn set_tooltip(&self, tooltip: &str) {
        self.send(UiCommand::SetTooltip(tooltip.to_string()));
    }
}

impl WindowControl for UiBridge {
    fn show(&self) {
        self.send(UiCommand::ShowWindow);
    }

    fn hide(&self) {
        self.send(UiCommand::HideWindow);
    }

    fn request_focus(&self) {
        self.send(UiCommand::RequestFocus);
    }

    fn set_text(&self, region: WindowRegion, text: &str) {
        self.send(UiCommand::SetWindowText {
            region,
            text: text.to_string(),
        });
    }
}

// ============================================================================
// RecordingUi
// ============================================================================

/// Records every tray and window call, for tests.
#[derive(Debug, Default)]
pub struct RecordingUi {
    commands: Mutex<Vec<UiCommand>>,
}

impl RecordingUi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded commands in call order.
    #[must_use]
    pub fn commands(&self) -> Vec<UiCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Returns the most recent tray title, if any was set.
    #[must_use]
    pub fn last_title(&self) -> Option<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|command| match command {
                UiCommand::SetTitle(title) => Some(title.clone()),
                _ => None,
            })
    }

    /// Returns the most recent break timer text, if any was set.
    #[must_use]
    pub fn last_timer_text(&self) -> Option<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|command| match command {
                UiCommand::SetWindowText {
                    region: WindowRegion::Timer,
                    text,
                } => Some(text.clone()),
                _ => None,
            })
    }

    /// Counts recorded commands equal to `command`.
    #[must_use]
    pub fn count(&self, command: &UiCommand) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    fn push(&self, command: UiCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

impl TrayControl for RecordingUi {
    fn set_title(&self, title: &str) {
        self.push(UiCommand::SetTitle(title.to_string()));
    }

    fn set_tooltip(&self, tooltip: &str) {
        self.push(UiCommand::SetTooltip(tooltip.to_string()));
    }
}

impl WindowControl for RecordingUi {
    fn show(&self) {
        self.push(UiCommand::ShowWindow);
    }

    fn hide(&self) {
        self.push(UiCommand::HideWindow);
    }

    fn request_focus(&self) {
        self.push(UiCommand::RequestFocus);
    }

    fn set_text(&self, region: WindowRegion, text: &str) {
        self.push(UiCommand::SetWindowText {
            region,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_bridge_forwards_commands() {
        let (tx, rx) = unbounded();
        let bridge = UiBridge::new(tx);

        bridge.set_title("04:59");
        bridge.show();
        bridge.set_text(WindowRegion::Timer, "00:10");

        assert_eq!(rx.try_recv().unwrap(), UiCommand::SetTitle("04:59".to_string()));
        assert_eq!(rx.try_recv().unwrap(), UiCommand::ShowWindow);
        assert_eq!(
            rx.try_recv().unwrap(),
            UiCommand::SetWindowText {
                region: WindowRegion::Timer,
                text: "00:10".to_string()
            }
        );
    }

    #[test]
    fn test_bridge_survives_closed_channel() {
        let (tx, rx) = unbounded();
        drop(rx);
        let bridge = UiBridge::new(tx);
        bridge.hide();
        bridge.set_tooltip("still fine");
    }

    #[test]
    fn test_recording_ui_queries() {
        let ui = RecordingUi::new();
        ui.set_title("00:02");
        ui.set_title("00:01");
        ui.set_text(WindowRegion::Timer, "00:03");
        ui.hide();
        ui.hide();

        assert_eq!(ui.last_title(), Some("00:01".to_string()));
        assert_eq!(ui.last_timer_text(), Some("00:03".to_string()));
        assert_eq!(ui.count(&UiCommand::HideWindow), 2);

        ui.clear();
        assert!(ui.commands().is_empty());
    }
}
