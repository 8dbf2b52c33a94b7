use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::engine::state::BeatKind;

use super::{AudioCues, TimeSource};

/// Cue backend that plays nothing.
///
/// Used when the cue samples failed to load or no output device exists:
/// the metronome keeps scheduling and publishing beats, triggers are no-ops.
#[derive(Debug, Default)]
pub struct SilentCues {
    _unit: (),
}

impl SilentCues {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioCues for SilentCues {
    fn play_regular(&self) {}

    fn play_accent(&self) {}
}

/// Cue backend that records every trigger instead of playing it.
///
/// Deterministic stand-in for tests and the CLI harness.
#[derive(Debug, Default)]
pub struct RecordingCues {
    triggers: Mutex<Vec<BeatKind>>,
}

impl RecordingCues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every cue triggered so far, in order.
    pub fn triggers(&self) -> Vec<BeatKind> {
        self.triggers
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn accent_count(&self) -> usize {
        self.count(BeatKind::Accent)
    }

    pub fn regular_count(&self) -> usize {
        self.count(BeatKind::Regular)
    }

    fn count(&self, kind: BeatKind) -> usize {
        self.triggers
            .lock()
            .map(|guard| guard.iter().filter(|k| **k == kind).count())
            .unwrap_or(0)
    }

    fn record(&self, kind: BeatKind) {
        if let Ok(mut guard) = self.triggers.lock() {
            guard.push(kind);
        }
    }
}

impl AudioCues for RecordingCues {
    fn play_regular(&self) {
        self.record(BeatKind::Regular);
    }

    fn play_accent(&self) {
        self.record(BeatKind::Accent);
    }
}

/// Deterministic time source for desktop runs and tests.
///
/// Each call to `now()` advances by a fixed step (10ms by default) to
/// guarantee strictly increasing timestamps without a running clock.
pub struct StubTimeSource {
    start: Instant,
    step_ms: u64,
    offset_ms: AtomicU64,
}

impl StubTimeSource {
    pub fn new() -> Self {
        Self::with_step(Duration::from_millis(10))
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            start: Instant::now(),
            step_ms: step.as_millis() as u64,
            offset_ms: AtomicU64::new(0),
        }
    }
}

impl Default for StubTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StubTimeSource {
    fn now(&self) -> Instant {
        let ms = self.offset_ms.fetch_add(self.step_ms, Ordering::SeqCst);
        self.start + Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_cues_keep_order() {
        let cues = RecordingCues::new();
        cues.play_regular();
        cues.play_accent();
        cues.play(BeatKind::Regular);

        assert_eq!(
            cues.triggers(),
            vec![BeatKind::Regular, BeatKind::Accent, BeatKind::Regular]
        );
        assert_eq!(cues.accent_count(), 1);
        assert_eq!(cues.regular_count(), 2);
    }

    #[test]
    fn test_silent_cues_accept_triggers() {
        let cues = SilentCues::new();
        cues.play_regular();
        cues.play_accent();
    }

    #[test]
    fn test_stub_time_source_is_monotonic() {
        let source = StubTimeSource::with_step(Duration::from_millis(5));
        let first = source.now();
        let second = source.now();
        assert_eq!(second.duration_since(first), Duration::from_millis(5));
    }
}
