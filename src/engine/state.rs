//! Beat scheduler state: tempo, grouping, play state and beat index.
//!
//! Everything here is plain data with no timers attached, so the accent
//! cycle can be tested without a runtime. [`BeatScheduler`] owns one
//! [`SchedulerState`] behind its lock and drives [`SchedulerState::advance`]
//! from its timer task.
//!
//! [`BeatScheduler`]: crate::engine::BeatScheduler

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Slowest supported tempo in beats per minute
pub const MIN_TEMPO: u32 = 40;
/// Fastest supported tempo in beats per minute
pub const MAX_TEMPO: u32 = 240;
/// Tempo a fresh metronome starts at
pub const DEFAULT_TEMPO: u32 = 120;
/// Grouping a fresh metronome starts at
pub const DEFAULT_GROUPING: u32 = 4;

/// Tempo in beats per minute, always within [`MIN_TEMPO`]..=[`MAX_TEMPO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Tempo(u32);

impl Tempo {
    /// Build a tempo, clamping out-of-range values to the nearest bound.
    pub fn new(bpm: u32) -> Self {
        Self(bpm.clamp(MIN_TEMPO, MAX_TEMPO))
    }

    pub fn bpm(self) -> u32 {
        self.0
    }

    /// Time between two ticks: 60000 / bpm milliseconds.
    ///
    /// Computed in nanoseconds so tempos that do not divide 60000 evenly
    /// (e.g. 70 BPM = 857.142857 ms) do not drift by whole milliseconds.
    pub fn interval(self) -> Duration {
        Duration::from_nanos(60_000_000_000 / self.0 as u64)
    }

    /// Tick interval in (fractional) milliseconds.
    pub fn interval_ms(self) -> f64 {
        60_000.0 / self.0 as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(DEFAULT_TEMPO)
    }
}

impl From<u32> for Tempo {
    fn from(bpm: u32) -> Self {
        Self::new(bpm)
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

/// Beats per accent cycle, restricted to the fixed option set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Grouping(u32);

impl Grouping {
    /// Every grouping the UI offers, in display order.
    pub const OPTIONS: [u32; 5] = [2, 3, 4, 6, 8];

    pub fn new(beats: u32) -> Option<Self> {
        Self::OPTIONS.contains(&beats).then_some(Self(beats))
    }

    pub fn beats(self) -> u32 {
        self.0
    }

    /// All supported groupings in display order.
    pub fn all() -> impl Iterator<Item = Grouping> {
        Self::OPTIONS.into_iter().map(Grouping)
    }
}

impl Default for Grouping {
    fn default() -> Self {
        Self(DEFAULT_GROUPING)
    }
}

impl TryFrom<u32> for Grouping {
    type Error = SchedulerError;

    fn try_from(beats: u32) -> Result<Self, Self::Error> {
        Self::new(beats).ok_or(SchedulerError::GroupingInvalid { beats })
    }
}

impl From<Grouping> for u32 {
    fn from(grouping: Grouping) -> Self {
        grouping.0
    }
}

/// Whether the scheduler is actively ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

impl PlayState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlayState::Playing)
    }

    pub fn toggled(self) -> Self {
        match self {
            PlayState::Stopped => PlayState::Playing,
            PlayState::Playing => PlayState::Stopped,
        }
    }
}

/// Classification of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatKind {
    /// First beat of a grouping cycle (beat index 0)
    Accent,
    Regular,
}

/// Result of advancing the state by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub beat_index: u32,
    pub kind: BeatKind,
}

/// Owned metronome state mutated by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulerState {
    pub tempo: Tempo,
    pub grouping: Grouping,
    pub play_state: PlayState,
    pub beat_index: u32,
}

impl SchedulerState {
    pub fn new(tempo: Tempo, grouping: Grouping) -> Self {
        Self {
            tempo,
            grouping,
            play_state: PlayState::Stopped,
            beat_index: 0,
        }
    }

    /// Advance the beat index modulo the grouping and classify the tick.
    ///
    /// The index is not clamped when the grouping shrinks; the modulo here
    /// brings it back into range on the next tick.
    pub fn advance(&mut self) -> Tick {
        let beats = self.grouping.beats();
        self.beat_index = (self.beat_index + 1) % beats;
        let kind = if self.beat_index == 0 {
            BeatKind::Accent
        } else {
            BeatKind::Regular
        };
        Tick {
            beat_index: self.beat_index,
            kind,
        }
    }

    /// Flip the play state and return the new one.
    pub fn toggle(&mut self) -> PlayState {
        self.play_state = self.play_state.toggled();
        self.play_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_clamps_to_range() {
        assert_eq!(Tempo::new(0).bpm(), MIN_TEMPO);
        assert_eq!(Tempo::new(39).bpm(), MIN_TEMPO);
        assert_eq!(Tempo::new(40).bpm(), 40);
        assert_eq!(Tempo::new(240).bpm(), 240);
        assert_eq!(Tempo::new(241).bpm(), MAX_TEMPO);
        assert_eq!(Tempo::new(u32::MAX).bpm(), MAX_TEMPO);
    }

    #[test]
    fn test_tempo_interval_formula() {
        assert_eq!(Tempo::new(120).interval(), Duration::from_millis(500));
        assert_eq!(Tempo::new(60).interval(), Duration::from_millis(1000));
        assert_eq!(Tempo::new(40).interval(), Duration::from_millis(1500));
        assert_eq!(Tempo::new(240).interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_tempo_interval_matches_ms_for_whole_range() {
        for bpm in MIN_TEMPO..=MAX_TEMPO {
            let tempo = Tempo::new(bpm);
            let expected_ms = 60_000.0 / bpm as f64;
            let actual_ms = tempo.interval().as_secs_f64() * 1_000.0;
            assert!(
                (actual_ms - expected_ms).abs() < 1e-6,
                "interval at {} BPM was {} ms, expected {} ms",
                bpm,
                actual_ms,
                expected_ms
            );
            assert!((tempo.interval_ms() - expected_ms).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tempo_display() {
        assert_eq!(Tempo::new(96).to_string(), "96 BPM");
    }

    #[test]
    fn test_tempo_deserialize_clamps() {
        let tempo: Tempo = serde_json::from_str("500").unwrap();
        assert_eq!(tempo.bpm(), MAX_TEMPO);
        assert_eq!(serde_json::to_string(&Tempo::new(90)).unwrap(), "90");
    }

    #[test]
    fn test_grouping_accepts_only_options() {
        for beats in 0..=10 {
            let expected = Grouping::OPTIONS.contains(&beats);
            assert_eq!(Grouping::new(beats).is_some(), expected, "beats={}", beats);
        }
        assert!(matches!(
            Grouping::try_from(5),
            Err(SchedulerError::GroupingInvalid { beats: 5 })
        ));
    }

    #[test]
    fn test_grouping_deserialize_rejects_unknown() {
        assert!(serde_json::from_str::<Grouping>("6").is_ok());
        assert!(serde_json::from_str::<Grouping>("7").is_err());
    }

    #[test]
    fn test_grouping_all_in_display_order() {
        let beats: Vec<u32> = Grouping::all().map(Grouping::beats).collect();
        assert_eq!(beats, vec![2, 3, 4, 6, 8]);
    }

    #[test]
    fn test_default_state() {
        let state = SchedulerState::default();
        assert_eq!(state.tempo.bpm(), 120);
        assert_eq!(state.grouping.beats(), 4);
        assert_eq!(state.play_state, PlayState::Stopped);
        assert_eq!(state.beat_index, 0);
    }

    #[test]
    fn test_advance_cycles_for_every_grouping() {
        for grouping in Grouping::all() {
            let mut state = SchedulerState::new(Tempo::default(), grouping);
            let g = grouping.beats();

            for tick in 1..=(g * 3) {
                let result = state.advance();
                assert_eq!(result.beat_index, tick % g);
                assert!(state.beat_index < g);
                let expect_accent = tick % g == 0;
                assert_eq!(
                    result.kind == BeatKind::Accent,
                    expect_accent,
                    "grouping {} tick {}",
                    g,
                    tick
                );
            }
        }
    }

    #[test]
    fn test_advance_sequence_at_four() {
        let mut state = SchedulerState::default();
        let kinds: Vec<BeatKind> = (0..8).map(|_| state.advance().kind).collect();
        assert_eq!(
            kinds,
            vec![
                BeatKind::Regular,
                BeatKind::Regular,
                BeatKind::Regular,
                BeatKind::Accent,
                BeatKind::Regular,
                BeatKind::Regular,
                BeatKind::Regular,
                BeatKind::Accent,
            ]
        );
    }

    #[test]
    fn test_shrinking_grouping_wraps_by_modulo() {
        let mut state = SchedulerState::new(Tempo::default(), Grouping::new(8).unwrap());
        for _ in 0..5 {
            state.advance();
        }
        assert_eq!(state.beat_index, 5);

        state.grouping = Grouping::new(4).unwrap();
        // Index stays out of range until the next tick.
        assert_eq!(state.beat_index, 5);

        let tick = state.advance();
        assert_eq!(tick.beat_index, 2);
        assert_eq!(tick.kind, BeatKind::Regular);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut state = SchedulerState::default();
        assert_eq!(state.toggle(), PlayState::Playing);
        assert_eq!(state.toggle(), PlayState::Stopped);
        assert_eq!(state.play_state, PlayState::Stopped);
    }
}
