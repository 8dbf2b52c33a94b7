//! Configuration for the metronome core
//!
//! Runtime configuration is loaded from a JSON file so cue sounds and
//! channel sizes can be tuned without recompiling. Settings chosen in the
//! UI (tempo, grouping) are not persisted here; the file only supplies the
//! values a fresh metronome starts with.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::state::{Grouping, SchedulerState, Tempo, DEFAULT_GROUPING, DEFAULT_TEMPO};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub metronome: MetronomeConfig,
    pub cues: CueConfig,
    pub events: EventConfig,
}

/// Initial scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    /// Tempo at startup, clamped to 40-240
    pub initial_tempo: u32,
    /// Grouping at startup; unsupported values fall back to 4
    pub initial_grouping: u32,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            initial_tempo: DEFAULT_TEMPO,
            initial_grouping: DEFAULT_GROUPING,
        }
    }
}

impl MetronomeConfig {
    /// Build the stopped starting state, sanitizing out-of-range values.
    pub fn initial_state(&self) -> SchedulerState {
        let tempo = Tempo::new(self.initial_tempo);
        if tempo.bpm() != self.initial_tempo {
            log::warn!(
                "[Config] initial_tempo {} out of range, clamped to {}",
                self.initial_tempo,
                tempo.bpm()
            );
        }

        let grouping = Grouping::new(self.initial_grouping).unwrap_or_else(|| {
            log::warn!(
                "[Config] initial_grouping {} unsupported, using {}",
                self.initial_grouping,
                DEFAULT_GROUPING
            );
            Grouping::default()
        });

        SchedulerState::new(tempo, grouping)
    }
}

/// Audio cue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Sample rate cues are synthesized or resampled to
    pub sample_rate: u32,
    /// Length of the synthesized regular click
    pub click_duration_ms: f32,
    /// Length of the synthesized accent click
    pub accent_duration_ms: f32,
    /// Peak amplitude of the regular click
    pub click_gain: f32,
    /// Peak amplitude of the accent click
    pub accent_gain: f32,
    /// Optional WAV file replacing the synthesized regular click
    pub regular_path: Option<PathBuf>,
    /// Optional WAV file replacing the synthesized accent click
    pub accent_path: Option<PathBuf>,
    /// Pending cue triggers buffered between the timer and the audio backend
    pub dispatch_queue_depth: usize,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            click_duration_ms: 20.0,
            accent_duration_ms: 30.0,
            click_gain: 0.5,
            accent_gain: 1.0,
            regular_path: None,
            accent_path: None,
            dispatch_queue_depth: 16,
        }
    }
}

/// Broadcast channel sizing for UI observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Buffered beat events per subscriber before it lags
    pub beat_capacity: usize,
    /// Buffered lifecycle events per subscriber before it lags
    pub scheduler_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            beat_capacity: 128,
            scheduler_capacity: 64,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// the JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration on Android.
    ///
    /// Bundled assets are only reachable through the Android AssetManager,
    /// which this crate does not bind, so the defaults are used.
    #[cfg(target_os = "android")]
    pub fn load_android() -> Self {
        log::info!("[Config] Using default configuration on Android");
        Self::default()
    }

    /// Load configuration for non-Android platforms
    #[cfg(not(target_os = "android"))]
    pub fn load() -> Self {
        Self::load_from_file("assets/metronome_config.json")
    }

    /// Load configuration from the current platform's default location
    pub fn load_platform() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(target_os = "android")] {
                Self::load_android()
            } else {
                Self::load()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.metronome.initial_tempo, 120);
        assert_eq!(config.metronome.initial_grouping, 4);
        assert_eq!(config.cues.sample_rate, 48000);
        assert_eq!(config.cues.dispatch_queue_depth, 16);
        assert!(config.cues.regular_path.is_none());
        assert_eq!(config.events.beat_capacity, 128);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "metronome": { "initial_tempo": 90 } }"#).unwrap();
        assert_eq!(config.metronome.initial_tempo, 90);
        assert_eq!(config.metronome.initial_grouping, 4);
        assert_eq!(config.cues.click_duration_ms, 20.0);
    }

    #[test]
    fn test_initial_state_sanitizes_values() {
        let config = MetronomeConfig {
            initial_tempo: 500,
            initial_grouping: 5,
        };
        let state = config.initial_state();
        assert_eq!(state.tempo.bpm(), 240);
        assert_eq!(state.grouping.beats(), 4);
        assert!(!state.play_state.is_playing());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "metronome": {{ "initial_tempo": 72, "initial_grouping": 3 }}, "events": {{ "beat_capacity": 8 }} }}"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config.metronome.initial_tempo, 72);
        assert_eq!(config.metronome.initial_grouping, 3);
        assert_eq!(config.events.beat_capacity, 8);
        assert_eq!(config.events.scheduler_capacity, 64);
    }

    #[test]
    fn test_load_invalid_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config.metronome.initial_tempo, 120);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/metronome_config.json");
        assert_eq!(config.metronome.initial_grouping, 4);
    }

    #[test]
    fn test_load_platform_reads_bundled_defaults() {
        let config = AppConfig::load_platform();
        assert_eq!(config.metronome.initial_tempo, 120);
        assert_eq!(config.metronome.initial_grouping, 4);
        assert_eq!(config.cues.dispatch_queue_depth, 16);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = AppConfig::default();
        config.cues.accent_path = Some(PathBuf::from("assets/accent-click.wav"));
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.cues.accent_path, config.cues.accent_path);
        assert_eq!(parsed.cues.accent_gain, config.cues.accent_gain);
    }
}
