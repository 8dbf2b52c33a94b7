//! Backend abstractions for the beat scheduler: audio cues and time sources.

use std::time::Instant;

use crate::engine::state::BeatKind;

/// Trait implemented by platform-specific audio cue players.
///
/// Both triggers are fire-and-forget: they restart a preloaded sample from
/// its first frame, cutting off any in-progress playback of the same sample,
/// and return immediately. Implementations must not block; the scheduler
/// calls them from its cue dispatch task.
pub trait AudioCues: Send + Sync {
    fn play_regular(&self);
    fn play_accent(&self);

    /// Trigger the cue matching a tick classification.
    fn play(&self, kind: BeatKind) {
        match kind {
            BeatKind::Accent => self.play_accent(),
            BeatKind::Regular => self.play_regular(),
        }
    }
}

/// Trait representing a monotonic time source used for event timestamps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default time source backed by `Instant::now`.
#[derive(Default)]
pub struct SystemTimeSource {
    _unit: (),
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(not(target_os = "android"))]
mod cpal;
#[cfg(not(target_os = "android"))]
pub use cpal::CpalCues;

mod desktop_stub;
pub use desktop_stub::{RecordingCues, SilentCues, StubTimeSource};
