//! Desktop notifications.
//!
//! Notifications are fire-and-forget: the timer logs a failed send and
//! carries on. [`DesktopNotifier`] uses `notify-rust`, which talks to the
//! platform notification service (D-Bus on Linux, Notification Center on
//! macOS, toasts on Windows).

mod content;
pub mod error;

use std::sync::Mutex;

use notify_rust::Notification;

pub use self::content::{break_started_content, work_started_content, NotificationContent};
pub use self::error::NotificationError;

/// Application name shown as the notification source.
pub const APP_NAME: &str = "Work Break Timer";

/// Trait for sending notifications.
pub trait Notifier: Send + Sync {
    /// Shows a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be delivered.
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError>;
}

/// Sends notifications through the platform notification service.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        Notification::new()
            .appname(APP_NAME)
            .summary(&content.title)
            .body(&content.body)
            .show()
            .map(|_| ())
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }
}

/// Mock notifier that records every notification.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<NotificationContent>>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<NotificationContent> {
        self.sent.lock().unwrap().clone()
    }

    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.sent.lock().unwrap().push(content.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records() {
        let mock = MockNotifier::new();
        mock.notify(&work_started_content(1)).unwrap();
        mock.notify(&break_started_content()).unwrap();

        assert_eq!(mock.notification_count(), 2);
        assert_eq!(
            mock.titles(),
            vec!["No.1 Start Work Timer".to_string(), "Start Break Timer".to_string()]
        );
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockNotifier::new();
        mock.set_should_fail(true);

        let result = mock.notify(&break_started_content());
        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
        assert_eq!(mock.notification_count(), 0);
    }
}
