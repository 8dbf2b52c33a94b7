//! Engine module housing the beat scheduler.
//!
//! `state` holds the pure tempo/grouping/beat-index state machine,
//! `scheduler` drives it from a tokio timer, `backend` defines the audio cue
//! and time source seams, and `core` wires them into the `MetronomeHandle`
//! used by UI bindings.

pub mod backend;
pub mod core;
pub mod events;
pub mod scheduler;
pub mod state;

#[cfg(not(target_os = "android"))]
pub use backend::CpalCues;
pub use backend::{
    AudioCues, RecordingCues, SilentCues, StubTimeSource, SystemTimeSource, TimeSource,
};
pub use core::{CueSetup, CueStatus, MetronomeHandle};
pub use events::{BeatEvent, SchedulerEvent, SchedulerEventKind, SchedulerSnapshot, SettingsPatch};
pub use scheduler::{BeatScheduler, SchedulerOptions};
pub use state::{BeatKind, Grouping, PlayState, SchedulerState, Tempo, MAX_TEMPO, MIN_TEMPO};
