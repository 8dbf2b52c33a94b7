use super::*;
use std::time::Duration;

use crate::engine::backend::{RecordingCues, StubTimeSource};
use crate::engine::state::BeatKind;

impl MetronomeHandle {
    /// Handle wired to recording cues so tests can inspect every trigger.
    pub(crate) fn new_recording(config: AppConfig) -> (Self, Arc<RecordingCues>) {
        let cues = Arc::new(RecordingCues::new());
        let setup = CueSetup::ready(Arc::clone(&cues) as Arc<dyn AudioCues>);
        let handle = Self::with_cues(config, setup, Arc::new(StubTimeSource::default()))
            .expect("runtime builds");
        (handle, cues)
    }
}

fn fast_config(tempo: u32, grouping: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.metronome.initial_tempo = tempo;
    config.metronome.initial_grouping = grouping;
    config
}

#[test]
fn test_handle_starts_stopped_with_config_values() {
    let (handle, _cues) = MetronomeHandle::new_recording(fast_config(90, 3));
    let snapshot = handle.snapshot().unwrap();

    assert_eq!(snapshot.tempo, 90);
    assert_eq!(snapshot.grouping, 3);
    assert_eq!(snapshot.play_state, PlayState::Stopped);
    assert_eq!(snapshot.beat_index, 0);
    assert_eq!(handle.cue_status(), &CueStatus::Ready);
}

#[test]
fn test_handle_plays_accent_cycle_in_real_time() {
    let (handle, cues) = MetronomeHandle::new_recording(fast_config(240, 2));
    let mut beats = handle.subscribe_beats();

    assert_eq!(handle.toggle_play().unwrap(), PlayState::Playing);
    let kinds: Vec<BeatKind> = (0..4)
        .map(|_| beats.blocking_recv().expect("beat event").kind)
        .collect();
    handle.stop().unwrap();

    assert_eq!(
        kinds,
        vec![
            BeatKind::Regular,
            BeatKind::Accent,
            BeatKind::Regular,
            BeatKind::Accent
        ]
    );

    std::thread::sleep(Duration::from_millis(50));
    assert!(cues.triggers().starts_with(&kinds));
    assert!(!handle.scheduler().is_timer_armed().unwrap());
}

#[test]
fn test_stop_is_noop_when_stopped() {
    let (handle, _cues) = MetronomeHandle::new_recording(AppConfig::default());
    let mut events = handle.subscribe_events();

    handle.stop().unwrap();
    assert!(!handle.snapshot().unwrap().is_playing());
    assert!(events.try_recv().is_err(), "no lifecycle event for a no-op stop");
}

#[test]
fn test_missing_cue_asset_degrades_to_silent() {
    let mut config = AppConfig::default();
    config.cues.regular_path = Some("/nonexistent/click.wav".into());

    let setup = MetronomeHandle::create_cues(&config);
    match &setup.status {
        CueStatus::Silent { reason } => assert!(reason.contains("regular")),
        other => panic!("expected silent cues, got {:?}", other),
    }

    // Silent cues still schedule beats.
    let handle =
        MetronomeHandle::with_cues(config, setup, Arc::new(StubTimeSource::default())).unwrap();
    assert!(matches!(handle.cue_status(), CueStatus::Silent { .. }));
    handle.set_tempo(240).unwrap();
    let mut beats = handle.subscribe_beats();
    handle.toggle_play().unwrap();
    assert!(beats.blocking_recv().is_ok());
}

#[test]
fn test_drop_while_playing_stops_timer() {
    let (handle, cues) = MetronomeHandle::new_recording(fast_config(240, 4));
    handle.toggle_play().unwrap();
    drop(handle);

    std::thread::sleep(Duration::from_millis(400));
    let count = cues.triggers().len();
    std::thread::sleep(Duration::from_millis(600));
    assert_eq!(cues.triggers().len(), count, "no cues after drop");
}
