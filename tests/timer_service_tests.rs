//! Integration tests for the timer service.
//!
//! These tests drive a spawned TimerService on a paused tokio clock with a
//! JSON preference store on disk and recording sinks:
//! - Full work → break → work cycles
//! - Round counter persistence across days
//! - Disable and settings changes while running
//! - UI commands flowing through the crossbeam bridge

use std::sync::Arc;

use chrono::NaiveDate;
use crossbeam_channel::unbounded;
use tokio::time::{sleep, timeout, Duration};

use work_break_timer::daemon::{TimerController, TimerEngine, TimerService, TimerSinks};
use work_break_timer::menubar::{RecordingUi, UiBridge, UiCommand, WindowRegion};
use work_break_timer::notification::MockNotifier;
use work_break_timer::prefs::{JsonPreferenceStore, PreferenceStore};
use work_break_timer::rounds::{RoundCounter, WORK_ROUND_COUNT_KEY};
use work_break_timer::sound::MockSoundPlayer;
use work_break_timer::types::{DurationSettings, TimerPhase};

// ============================================================================
// Test Helpers
// ============================================================================

const WAIT: Duration = Duration::from_secs(120);

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn engine_with(
    durations: DurationSettings,
    store: Arc<dyn PreferenceStore>,
    sinks: TimerSinks,
    today: &'static str,
) -> TimerEngine {
    TimerEngine::new(durations, RoundCounter::new(store), sinks)
        .with_date_source(Arc::new(move || date(today)))
}

fn recording_sinks() -> (TimerSinks, Arc<RecordingUi>, Arc<MockNotifier>) {
    let ui = Arc::new(RecordingUi::new());
    let notifier = Arc::new(MockNotifier::new());
    let sinks = TimerSinks {
        notifier: notifier.clone(),
        window: ui.clone(),
        tray: ui.clone(),
    };
    (sinks, ui, notifier)
}

async fn wait_for_phase(controller: &TimerController, phase: TimerPhase) {
    let mut rx = controller.subscribe();
    timeout(WAIT, rx.wait_for(|s| s.phase == phase))
        .await
        .expect("timed out waiting for phase")
        .expect("service stopped");
}

// ============================================================================
// Round counter persistence
// ============================================================================

mod persistence_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_completed_round_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let store = Arc::new(JsonPreferenceStore::open(&path).unwrap());
        store
            .set_string_list(WORK_ROUND_COUNT_KEY, &["2024-01-01,3".to_string()])
            .unwrap();

        let (sinks, _ui, notifier) = recording_sinks();
        let engine = engine_with(DurationSettings::new(2, 60, 60), store, sinks, "2024-01-02");
        let handle = TimerService::spawn(engine, Arc::new(MockSoundPlayer::new()));
        let controller = handle.controller();

        controller.enable().unwrap();
        wait_for_phase(&controller, TimerPhase::Breaking).await;
        handle.shutdown().await.unwrap();

        let reopened = JsonPreferenceStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_string_list(WORK_ROUND_COUNT_KEY),
            vec!["2024-01-01,3".to_string(), "2024-01-02,1".to_string()]
        );
        assert_eq!(notifier.titles()[0], "No.1 Start Work Timer");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_accumulate_within_a_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let store = Arc::new(JsonPreferenceStore::open(&path).unwrap());

        let (sinks, _ui, notifier) = recording_sinks();
        let engine = engine_with(DurationSettings::new(1, 1, 60), store.clone(), sinks, "2024-03-10");
        let handle = TimerService::spawn(engine, Arc::new(MockSoundPlayer::new()));
        let controller = handle.controller();

        controller.enable().unwrap();
        // Three work phases complete; the fourth is running.
        let mut rx = controller.subscribe();
        timeout(WAIT, async {
            while notifier
                .titles()
                .iter()
                .all(|t| t != "No.4 Start Work Timer")
            {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        handle.shutdown().await.unwrap();

        assert_eq!(
            store.get_string_list(WORK_ROUND_COUNT_KEY),
            vec!["2024-03-10,3".to_string()]
        );
    }
}

// ============================================================================
// Running timer control
// ============================================================================

mod control_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_disable_during_break_hides_window_and_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonPreferenceStore::open(dir.path().join("p.json")).unwrap());
        let (sinks, ui, _notifier) = recording_sinks();
        let engine = engine_with(DurationSettings::new(1, 300, 60), store, sinks, "2024-01-02");
        let sound = Arc::new(MockSoundPlayer::new());
        let handle = TimerService::spawn(engine, sound.clone());
        let controller = handle.controller();

        controller.enable().unwrap();
        wait_for_phase(&controller, TimerPhase::Breaking).await;
        ui.clear();

        controller.disable().unwrap();
        wait_for_phase(&controller, TimerPhase::Idle).await;
        sleep(Duration::from_secs(600)).await;

        assert_eq!(controller.snapshot().phase, TimerPhase::Idle);
        assert_eq!(ui.count(&UiCommand::HideWindow), 1);
        assert_eq!(ui.count(&UiCommand::ShowWindow), 0);
        // One chime for the finished work phase, one for the stopped break.
        assert_eq!(sound.play_count(), 2);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_during_break_starts_work() {
        let store: Arc<dyn PreferenceStore> =
            Arc::new(work_break_timer::prefs::MemoryPreferenceStore::new());
        let (sinks, ui, _notifier) = recording_sinks();
        let engine = engine_with(DurationSettings::new(1, 300, 60), store, sinks, "2024-01-02");
        let handle = TimerService::spawn(engine, Arc::new(MockSoundPlayer::new()));
        let controller = handle.controller();

        controller.enable().unwrap();
        wait_for_phase(&controller, TimerPhase::Breaking).await;

        controller.enable().unwrap();
        wait_for_phase(&controller, TimerPhase::Working).await;

        assert_eq!(controller.snapshot().remaining_seconds, 1);
        assert_eq!(ui.commands().last(), Some(&UiCommand::SetTitle("00:01".to_string())));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_length_phases_still_cycle() {
        let store: Arc<dyn PreferenceStore> =
            Arc::new(work_break_timer::prefs::MemoryPreferenceStore::new());
        let (sinks, _ui, _notifier) = recording_sinks();
        let engine = engine_with(DurationSettings::new(0, 0, 60), store.clone(), sinks, "2024-01-02");
        let sound = Arc::new(MockSoundPlayer::new());
        let handle = TimerService::spawn(engine, sound.clone());
        let controller = handle.controller();

        controller.enable().unwrap();
        sleep(Duration::from_millis(4500)).await;
        handle.shutdown().await.unwrap();

        // One phase completes per second: work, break, work, break.
        assert_eq!(sound.play_count(), 4);
        assert_eq!(RoundCounter::new(store).count(date("2024-01-02")), 2);
    }
}

// ============================================================================
// UI bridge
// ============================================================================

mod bridge_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_break_screen_commands_reach_ui_thread() {
        let (ui_tx, ui_rx) = unbounded();
        let bridge = Arc::new(UiBridge::new(ui_tx));
        let sinks = TimerSinks {
            notifier: Arc::new(MockNotifier::new()),
            window: bridge.clone(),
            tray: bridge,
        };
        let store: Arc<dyn PreferenceStore> =
            Arc::new(work_break_timer::prefs::MemoryPreferenceStore::new());
        let engine = engine_with(DurationSettings::new(1, 65, 60), store, sinks, "2024-01-02");
        let handle = TimerService::spawn(engine, Arc::new(MockSoundPlayer::new()));
        let controller = handle.controller();

        controller.enable().unwrap();
        wait_for_phase(&controller, TimerPhase::Breaking).await;
        sleep(Duration::from_millis(1500)).await;
        handle.shutdown().await.unwrap();

        let commands: Vec<_> = ui_rx.try_iter().collect();
        assert!(commands.contains(&UiCommand::ShowWindow));
        assert!(commands.contains(&UiCommand::SetWindowText {
            region: WindowRegion::Reminder,
            text: "Time for a break!".to_string(),
        }));
        assert!(commands.contains(&UiCommand::SetWindowText {
            region: WindowRegion::Timer,
            text: "01:05".to_string(),
        }));
        assert!(commands.contains(&UiCommand::SetWindowText {
            region: WindowRegion::Timer,
            text: "01:04".to_string(),
        }));
    }
}
