//! Notification content for phase starts.

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Summary line
    pub title: String,
    /// Body text
    pub body: String,
}

/// Content sent when a work phase starts.
///
/// `round` is the number of the round about to begin (today's completed
/// rounds plus one).
pub fn work_started_content(round: u32) -> NotificationContent {
    NotificationContent {
        title: format!("No.{} Start Work Timer", round),
        body: "Start Work Timer".to_string(),
    }
}

/// Content sent when a break phase starts.
pub fn break_started_content() -> NotificationContent {
    NotificationContent {
        title: "Start Break Timer".to_string(),
        body: "Start Break Timer".to_string(),
    }
}
