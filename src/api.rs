// Public API for UI bindings
// The UI observes a ControlPanel view model and forwards input as UiCommand
// values; it never touches scheduler state directly.

use crate::engine::MetronomeHandle;
use crate::error::SchedulerError;

pub mod streams;
pub mod types;

pub use streams::{beat_stream, scheduler_event_stream};
pub use types::{ControlPanel, GroupingOption, TempoSlider, UiCommand};

/// Get the version of the metronome core
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Apply one UI command and return the refreshed view model.
///
/// # Errors
/// - `GroupingInvalid` if a grouping button reports an unsupported value
/// - `LockPoisoned` on shared scheduler state
pub fn dispatch(handle: &MetronomeHandle, command: UiCommand) -> Result<ControlPanel, SchedulerError> {
    log::debug!("[Api] Dispatching {:?}", command);
    match command {
        UiCommand::SetTempo { bpm } => {
            handle.set_tempo(bpm)?;
        }
        UiCommand::SetGrouping { beats } => {
            handle.set_grouping(beats)?;
        }
        UiCommand::TogglePlay => {
            handle.toggle_play()?;
        }
    }
    control_panel(handle)
}

/// Current view model for rendering the metronome screen.
pub fn control_panel(handle: &MetronomeHandle) -> Result<ControlPanel, SchedulerError> {
    Ok(ControlPanel::from_snapshot(&handle.snapshot()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::{ErrorCode, SchedulerErrorCodes};

    #[test]
    fn test_get_version() {
        assert_eq!(get_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_dispatch_updates_panel() {
        let (handle, _cues) = MetronomeHandle::new_recording(AppConfig::default());

        let panel = dispatch(&handle, UiCommand::SetTempo { bpm: 96 }).unwrap();
        assert_eq!(panel.tempo_label, "96 BPM");
        assert_eq!(panel.tempo.value, 96);

        let panel = dispatch(&handle, UiCommand::SetGrouping { beats: 6 }).unwrap();
        let active: Vec<u32> = panel
            .groupings
            .iter()
            .filter(|g| g.active)
            .map(|g| g.beats)
            .collect();
        assert_eq!(active, vec![6]);

        let panel = dispatch(&handle, UiCommand::TogglePlay).unwrap();
        assert!(panel.is_playing);
        assert_eq!(panel.play_button_label, "Stop");

        let panel = dispatch(&handle, UiCommand::TogglePlay).unwrap();
        assert!(!panel.is_playing);
        assert_eq!(panel.play_button_label, "Start");
    }

    #[test]
    fn test_dispatch_invalid_grouping_reports_code() {
        let (handle, _cues) = MetronomeHandle::new_recording(AppConfig::default());
        let err = dispatch(&handle, UiCommand::SetGrouping { beats: 5 }).unwrap_err();
        assert_eq!(err.code(), SchedulerErrorCodes::GROUPING_INVALID);

        let panel = control_panel(&handle).unwrap();
        assert!(panel.groupings.iter().any(|g| g.beats == 4 && g.active));
    }

    #[test]
    fn test_dispatch_clamps_slider_value() {
        let (handle, _cues) = MetronomeHandle::new_recording(AppConfig::default());
        let panel = dispatch(&handle, UiCommand::SetTempo { bpm: 300 }).unwrap();
        assert_eq!(panel.tempo.value, 240);
    }
}
