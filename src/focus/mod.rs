//! Break window focus enforcement.
//!
//! While a break is running the break window is supposed to stay in front.
//! When it leaves the foreground, [`FocusEnforcer`] waits the configured
//! force-focus delay and pulls it back, provided the break is still on.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::watch;
//! use work_break_timer::focus::FocusEnforcer;
//! use work_break_timer::menubar::RecordingUi;
//! use work_break_timer::types::TimerSnapshot;
//!
//! # async fn example() {
//! let (_tx, rx) = watch::channel(TimerSnapshot::default());
//! let enforcer = FocusEnforcer::new(
//!     Arc::new(RecordingUi::new()),
//!     rx,
//!     tokio::runtime::Handle::current(),
//! );
//!
//! // Called by the UI host when the break window loses focus.
//! if let Some(task) = enforcer.on_exited_foreground() {
//!     let refocused = task.await.unwrap_or(false);
//!     println!("refocused: {}", refocused);
//! }
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::menubar::WindowControl;
use crate::types::{TimerPhase, TimerSnapshot};

/// Brings the break window back to the front during breaks.
pub struct FocusEnforcer {
    window: Arc<dyn WindowControl>,
    snapshot: watch::Receiver<TimerSnapshot>,
    pending: Arc<AtomicBool>,
    runtime: Handle,
}

impl FocusEnforcer {
    /// Creates an enforcer that reads timer state from `snapshot` and
    /// schedules its delays on `runtime`.
    pub fn new(
        window: Arc<dyn WindowControl>,
        snapshot: watch::Receiver<TimerSnapshot>,
        runtime: Handle,
    ) -> Self {
        Self {
            window,
            snapshot,
            pending: Arc::new(AtomicBool::new(false)),
            runtime,
        }
    }

    /// Returns true while a refocus is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Reacts to the break window leaving the foreground.
    ///
    /// Outside a break this does nothing and returns `None`. During a break
    /// it schedules a focus request after `force_focus_seconds`; the task
    /// resolves to true if focus was requested. At most one request is
    /// scheduled at a time.
    pub fn on_exited_foreground(&self) -> Option<JoinHandle<bool>> {
        let snapshot = *self.snapshot.borrow();
        if snapshot.phase != TimerPhase::Breaking {
            return None;
        }
        if self.pending.swap(true, Ordering::SeqCst) {
            debug!("Refocus already scheduled");
            return None;
        }

        let delay = Duration::from_secs(u64::from(snapshot.durations.force_focus_seconds));
        let window = Arc::clone(&self.window);
        let pending = Arc::clone(&self.pending);
        let state = self.snapshot.clone();

        debug!(seconds = delay.as_secs(), "Break window lost focus");
        Some(self.runtime.spawn(async move {
            sleep(delay).await;
            pending.store(false, Ordering::SeqCst);

            if state.borrow().phase != TimerPhase::Breaking {
                debug!("Break ended before refocus");
                return false;
            }
            window.request_focus();
            true
        }))
    }
}

impl std::fmt::Debug for FocusEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusEnforcer")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menubar::{RecordingUi, UiCommand};
    use crate::types::DurationSettings;

    fn snapshot(phase: TimerPhase, force_focus_seconds: u32) -> TimerSnapshot {
        TimerSnapshot {
            phase,
            durations: DurationSettings::new(1500, 300, force_focus_seconds),
            ..TimerSnapshot::default()
        }
    }

    fn enforcer(
        phase: TimerPhase,
        force_focus_seconds: u32,
    ) -> (FocusEnforcer, Arc<RecordingUi>, watch::Sender<TimerSnapshot>) {
        let ui = Arc::new(RecordingUi::new());
        let (tx, rx) = watch::channel(snapshot(phase, force_focus_seconds));
        let enforcer = FocusEnforcer::new(ui.clone(), rx, Handle::current());
        (enforcer, ui, tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_outside_break() {
        let (enforcer, ui, _tx) = enforcer(TimerPhase::Working, 5);
        assert!(enforcer.on_exited_foreground().is_none());
        assert!(ui.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refocuses_after_delay() {
        let (enforcer, ui, _tx) = enforcer(TimerPhase::Breaking, 5);

        let task = enforcer.on_exited_foreground().unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(ui.count(&UiCommand::RequestFocus), 0);

        assert!(task.await.unwrap());
        assert_eq!(ui.count(&UiCommand::RequestFocus), 1);
        assert!(!enforcer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_refocus_when_break_ends() {
        let (enforcer, ui, tx) = enforcer(TimerPhase::Breaking, 5);

        let task = enforcer.on_exited_foreground().unwrap();
        tx.send_replace(snapshot(TimerPhase::Idle, 5));

        assert!(!task.await.unwrap());
        assert_eq!(ui.count(&UiCommand::RequestFocus), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_pending_request() {
        let (enforcer, ui, _tx) = enforcer(TimerPhase::Breaking, 5);

        let task = enforcer.on_exited_foreground().unwrap();
        assert!(enforcer.on_exited_foreground().is_none());
        task.await.unwrap();

        assert_eq!(ui.count(&UiCommand::RequestFocus), 1);
        assert!(enforcer.on_exited_foreground().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_refocuses_immediately() {
        let (enforcer, ui, _tx) = enforcer(TimerPhase::Breaking, 0);
        assert!(enforcer.on_exited_foreground().unwrap().await.unwrap());
        assert_eq!(ui.count(&UiCommand::RequestFocus), 1);
    }
}
