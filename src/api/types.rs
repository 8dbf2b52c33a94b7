use serde::{Deserialize, Serialize};

use crate::engine::{Grouping, SchedulerSnapshot, Tempo, MAX_TEMPO, MIN_TEMPO};

/// Input forwarded from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    SetTempo { bpm: u32 },
    SetGrouping { beats: u32 },
    TogglePlay,
}

/// Tempo slider bounds and position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoSlider {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub value: u32,
}

/// One grouping button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingOption {
    pub beats: u32,
    pub active: bool,
}

/// Everything the metronome screen renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPanel {
    pub title: String,
    pub tempo_label: String,
    pub tempo: TempoSlider,
    pub grouping_label: String,
    pub groupings: Vec<GroupingOption>,
    pub play_button_label: String,
    pub is_playing: bool,
    pub beat_index: u32,
}

impl ControlPanel {
    pub fn from_snapshot(snapshot: &SchedulerSnapshot) -> Self {
        let groupings = Grouping::all()
            .map(|g| GroupingOption {
                beats: g.beats(),
                active: g.beats() == snapshot.grouping,
            })
            .collect();

        Self {
            title: "Metronome".to_string(),
            tempo_label: Tempo::new(snapshot.tempo).to_string(),
            tempo: TempoSlider {
                min: MIN_TEMPO,
                max: MAX_TEMPO,
                step: 1,
                value: snapshot.tempo,
            },
            grouping_label: "Note Grouping:".to_string(),
            groupings,
            play_button_label: if snapshot.is_playing() { "Stop" } else { "Start" }.to_string(),
            is_playing: snapshot.is_playing(),
            beat_index: snapshot.beat_index,
        }
    }
}
