//! Foreground timer process.
//!
//! Wires the pieces together:
//!
//! ```text
//! main thread                         tokio runtime
//! ───────────                         ─────────────
//! UiController ◀── UiCommand ──────── TimerService (TimerEngine)
//!     │                                     ▲
//!     └── AppActions ── TimerCommand ───────┘
//!              └──── FocusEnforcer (delayed refocus task)
//! ```

use std::io::{self, BufReader};
use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Sender};
use tracing::{info, warn};

use crate::focus::FocusEnforcer;
use crate::menubar::{
    spawn_console_input, MenuAction, MenuItemId, UiBridge, UiController, UiEvent, UiHandler,
};
use crate::notification::DesktopNotifier;
use crate::prefs::PreferenceStore;
use crate::rounds::RoundCounter;
use crate::settings::{SettingEdit, Settings, SettingsError, SettingsForm};
use crate::sound::{validate_clip, RodioSoundPlayer, SilentSoundPlayer, SoundPlayer, CHIME};

use super::service::{ServiceStopped, TimerController, TimerService};
use super::timer::{TimerEngine, TimerSinks};

/// Options for [`run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip the completion chime and never open an audio device
    pub no_sound: bool,
}

/// Runs the timer in the foreground until Quit or Ctrl-C.
///
/// A work phase starts immediately.
///
/// # Errors
///
/// Returns an error if the chime cannot be decoded or played, or if the
/// runtime or UI cannot be set up.
pub fn run(store: Arc<dyn PreferenceStore>, options: RunOptions) -> Result<()> {
    validate_clip(CHIME).context("Embedded chime cannot be decoded")?;
    let sound: Arc<dyn SoundPlayer> = if options.no_sound {
        Arc::new(SilentSoundPlayer)
    } else {
        let player = RodioSoundPlayer::new()
            .map_err(|e| anyhow!("{e}; {}", e.suggestion()))
            .context("Failed to open audio output")?;
        Arc::new(player)
    };

    let settings = Settings::load(store.as_ref());
    info!(?settings, "Starting timer");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("timer")
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    let _guard = runtime.enter();

    let (ui_tx, ui_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    let bridge = Arc::new(UiBridge::new(ui_tx));

    let engine = TimerEngine::new(
        settings.durations(),
        RoundCounter::new(Arc::clone(&store)),
        TimerSinks {
            notifier: Arc::new(DesktopNotifier::new()),
            window: bridge.clone(),
            tray: bridge.clone(),
        },
    );
    let handle = TimerService::spawn(engine, sound);
    let controller = handle.controller();

    spawn_interrupt_listener(event_tx.clone());
    spawn_console_input(BufReader::new(io::stdin()), event_tx)
        .context("Failed to read console input")?;

    let mut ui = UiController::new(ui_rx, event_rx, controller.subscribe(), io::stdout());
    ui.initialize()?;

    let focus = FocusEnforcer::new(bridge, controller.subscribe(), runtime.handle().clone());
    controller.enable()?;
    let mut actions = AppActions::new(controller, store, focus);

    let ui_result = ui.run(&mut actions);
    let service_result = runtime.block_on(handle.shutdown());

    ui_result?;
    service_result
}

/// Turns Ctrl-C into a Quit menu event.
fn spawn_interrupt_listener(events: Sender<UiEvent>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted");
                let _ = events.send(UiEvent::Menu(MenuItemId::Quit));
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });
}

// ============================================================================
// AppActions
// ============================================================================

/// Carries out menu actions on the timer.
pub struct AppActions {
    controller: TimerController,
    store: Arc<dyn PreferenceStore>,
    focus: FocusEnforcer,
}

impl AppActions {
    /// Creates the action handler.
    pub fn new(
        controller: TimerController,
        store: Arc<dyn PreferenceStore>,
        focus: FocusEnforcer,
    ) -> Self {
        Self {
            controller,
            store,
            focus,
        }
    }

    /// Re-reads the preference store and applies the durations.
    fn reload_settings(&self) -> Result<()> {
        self.store.reload()?;
        let settings = Settings::load(self.store.as_ref());
        self.controller.apply_settings(settings.durations())?;
        info!(?settings, "Settings reloaded");
        Ok(())
    }
}

impl UiHandler for AppActions {
    fn on_action(&mut self, action: MenuAction) -> ControlFlow<()> {
        let result = match action {
            MenuAction::Enable => self.controller.enable().map_err(Into::into),
            MenuAction::Disable => self.controller.disable().map_err(Into::into),
            MenuAction::Settings => self.reload_settings(),
            MenuAction::Quit => return ControlFlow::Break(()),
        };

        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) if e.is::<ServiceStopped>() => {
                warn!(error = %e, %action, "Timer is gone");
                ControlFlow::Break(())
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), %action, "Menu action failed");
                ControlFlow::Continue(())
            }
        }
    }

    fn on_focus_lost(&mut self) {
        // Detached; the refocus task ends on its own.
        let _ = self.focus.on_exited_foreground();
    }

    fn on_settings_submit(&mut self, edits: &[SettingEdit]) -> Result<Settings, SettingsError> {
        if let Err(e) = self.store.reload() {
            warn!(error = %e, "Editing settings from the last loaded preferences");
        }
        let mut form = SettingsForm::from_settings(&Settings::load(self.store.as_ref()));
        form.apply_edits(edits)?;

        let controller = &self.controller;
        form.submit(self.store.as_ref(), |settings| {
            if let Err(e) = controller.apply_settings(settings.durations()) {
                warn!(error = %e, "Settings saved but not applied");
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::service::TimerHandle;
    use crate::menubar::RecordingUi;
    use crate::notification::MockNotifier;
    use crate::prefs::MemoryPreferenceStore;
    use crate::settings::SettingField;
    use crate::sound::MockSoundPlayer;
    use crate::types::{DurationSettings, TimerPhase};
    use tokio::time::{timeout, Duration};

    fn spawn(store: Arc<dyn PreferenceStore>) -> (TimerHandle, AppActions) {
        let ui = Arc::new(RecordingUi::new());
        let engine = TimerEngine::new(
            Settings::load(store.as_ref()).durations(),
            RoundCounter::new(Arc::clone(&store)),
            TimerSinks {
                notifier: Arc::new(MockNotifier::new()),
                window: ui.clone(),
                tray: ui.clone(),
            },
        );
        let handle = TimerService::spawn(engine, Arc::new(MockSoundPlayer::new()));
        let controller = handle.controller();
        let focus = FocusEnforcer::new(
            ui,
            controller.subscribe(),
            tokio::runtime::Handle::current(),
        );
        (handle, AppActions::new(controller, store, focus))
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_and_disable_actions() {
        let (handle, mut actions) = spawn(Arc::new(MemoryPreferenceStore::new()));
        let mut rx = handle.controller().subscribe();

        assert!(actions.on_action(MenuAction::Enable).is_continue());
        timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == TimerPhase::Working))
            .await
            .unwrap()
            .unwrap();

        assert!(actions.on_action(MenuAction::Disable).is_continue());
        timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == TimerPhase::Idle))
            .await
            .unwrap()
            .unwrap();

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_action_applies_stored_durations() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let (handle, mut actions) = spawn(store.clone());

        store.set_int(SettingField::BreakMinutes.key(), 7).unwrap();
        assert!(actions.on_action(MenuAction::Settings).is_continue());

        let mut rx = handle.controller().subscribe();
        let snapshot = *timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| s.durations.break_seconds == 420),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(snapshot.durations, DurationSettings::new(1500, 420, 60));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitted_settings_apply_to_next_phase() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let (handle, mut actions) = spawn(store.clone());
        let mut rx = handle.controller().subscribe();

        assert!(actions.on_action(MenuAction::Enable).is_continue());
        timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == TimerPhase::Working))
            .await
            .unwrap()
            .unwrap();

        let settings = actions
            .on_settings_submit(&[SettingEdit::new("work", "1"), SettingEdit::new("break", "7")])
            .unwrap();
        assert_eq!(settings.work_minutes, 1);
        assert_eq!(store.get_int(SettingField::BreakMinutes.key(), 0), 7);

        let snapshot = *timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| s.durations.work_seconds == 60),
        )
        .await
        .unwrap()
        .unwrap();
        // The running work phase keeps its original target.
        assert_eq!(snapshot.phase, TimerPhase::Working);
        assert_eq!(snapshot.target_seconds, 1500);
        assert_eq!(snapshot.durations, DurationSettings::new(60, 420, 60));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_submit_is_rejected_and_not_applied() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let (handle, mut actions) = spawn(store.clone());

        let err = actions
            .on_settings_submit(&[SettingEdit::new("work", "10"), SettingEdit::new("break", "1000")])
            .unwrap_err();
        assert!(err.is_validation_error());

        let err = actions
            .on_settings_submit(&[SettingEdit::new("nap", "5")])
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnknownField(_)));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.get_int(SettingField::WorkMinutes.key(), -1), -1);
        assert_eq!(
            handle.controller().snapshot().durations,
            DurationSettings::default()
        );

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_breaks() {
        let (handle, mut actions) = spawn(Arc::new(MemoryPreferenceStore::new()));
        assert!(actions.on_action(MenuAction::Quit).is_break());
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_after_shutdown_break() {
        let (handle, mut actions) = spawn(Arc::new(MemoryPreferenceStore::new()));
        handle.shutdown().await.unwrap();
        assert!(actions.on_action(MenuAction::Enable).is_break());
    }
}
