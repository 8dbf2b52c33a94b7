//! Observer-facing types published by the beat scheduler.

use serde::{Deserialize, Serialize};

use crate::engine::state::{BeatKind, PlayState, SchedulerState};

/// One tick as seen by UI observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatEvent {
    /// Ticks fired since the scheduler was created (1-based)
    pub sequence: u64,
    pub beat_index: u32,
    pub kind: BeatKind,
    pub tempo: u32,
    pub grouping: u32,
    pub timestamp_ms: u64,
}

/// Lifecycle event emitted on play/stop and settings changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerEvent {
    pub timestamp_ms: u64,
    pub kind: SchedulerEventKind,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEventKind {
    Started { tempo: u32, grouping: u32 },
    Stopped { beat_index: u32 },
    TempoChanged { bpm: u32 },
    GroupingChanged { beats: u32 },
    Warning,
}

/// Point-in-time copy of the scheduler state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub tempo: u32,
    pub grouping: u32,
    pub play_state: PlayState,
    pub beat_index: u32,
    pub interval_ms: f64,
    pub ticks: u64,
}

impl SchedulerSnapshot {
    pub fn new(state: &SchedulerState, ticks: u64) -> Self {
        Self {
            tempo: state.tempo.bpm(),
            grouping: state.grouping.beats(),
            play_state: state.play_state,
            beat_index: state.beat_index,
            interval_ms: state.tempo.interval_ms(),
            ticks,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.play_state.is_playing()
    }
}

/// Settings update applied with a single timer reconfiguration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub tempo: Option<u32>,
    #[serde(default)]
    pub grouping: Option<u32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.tempo.is_none() && self.grouping.is_none()
    }
}
