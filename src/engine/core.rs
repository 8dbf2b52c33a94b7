//! MetronomeHandle: owner of the scheduler runtime, cue backend and config.
//!
//! UI bindings hold one handle per screen. It builds a single-worker tokio
//! runtime for the timer and cue tasks, loads the cue bank once, and
//! forwards UI input to the [`BeatScheduler`]. Dropping the handle stops
//! the timer and releases the cue backend.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::broadcast;

use crate::audio::CueBank;
use crate::config::AppConfig;
use crate::engine::backend::{AudioCues, SilentCues, SystemTimeSource, TimeSource};
use crate::engine::events::{BeatEvent, SchedulerEvent, SchedulerSnapshot, SettingsPatch};
use crate::engine::scheduler::{BeatScheduler, SchedulerOptions};
use crate::engine::state::{Grouping, PlayState, Tempo};
use crate::error::{log_audio_error, log_scheduler_error, AudioError, SchedulerError};

/// Whether audible cues are available.
#[derive(Debug, Clone, PartialEq)]
pub enum CueStatus {
    /// Cues loaded and an output backend is playing them
    Ready,
    /// Cues unavailable; ticks still run but play nothing
    Silent { reason: String },
}

/// Cue backend plus the status it was created with.
pub struct CueSetup {
    pub cues: Arc<dyn AudioCues>,
    pub status: CueStatus,
}

impl CueSetup {
    pub fn silent(reason: impl Into<String>) -> Self {
        Self {
            cues: Arc::new(SilentCues::new()),
            status: CueStatus::Silent {
                reason: reason.into(),
            },
        }
    }

    pub fn ready(cues: Arc<dyn AudioCues>) -> Self {
        Self {
            cues,
            status: CueStatus::Ready,
        }
    }

    fn from_error(err: AudioError) -> Self {
        log_audio_error(&err, "create_cues");
        log::warn!("[MetronomeHandle] Continuing with silent cues");
        Self::silent(err.to_string())
    }
}

/// MetronomeHandle orchestrates the scheduler and its collaborators.
pub struct MetronomeHandle {
    config: AppConfig,
    cue_status: CueStatus,
    scheduler: BeatScheduler,
    runtime: Option<Runtime>,
}

impl MetronomeHandle {
    /// Create a handle with platform config and the platform cue backend.
    pub fn new() -> Result<Self, SchedulerError> {
        Self::from_config(AppConfig::load_platform())
    }

    /// Create a handle from an explicit config with the platform cue backend.
    pub fn from_config(config: AppConfig) -> Result<Self, SchedulerError> {
        let cues = Self::create_cues(&config);
        Self::with_cues(config, cues, Arc::new(SystemTimeSource::default()))
    }

    /// Create a handle with a caller-provided cue backend.
    pub fn with_cues(
        config: AppConfig,
        cues: CueSetup,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, SchedulerError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("metronome-scheduler")
            .enable_time()
            .build()
            .map_err(|err| {
                let err = SchedulerError::RuntimeUnavailable {
                    reason: err.to_string(),
                };
                log_scheduler_error(&err, "MetronomeHandle::with_cues");
                err
            })?;

        let scheduler = BeatScheduler::new(
            cues.cues,
            runtime.handle().clone(),
            SchedulerOptions::from_config(&config),
            time_source,
        );

        Ok(Self {
            config,
            cue_status: cues.status,
            scheduler,
            runtime: Some(runtime),
        })
    }

    /// Load the cue bank and open the platform output.
    ///
    /// Any failure is logged and degrades to silent cues.
    pub fn create_cues(config: &AppConfig) -> CueSetup {
        let bank = match CueBank::load(&config.cues) {
            Ok(bank) => bank,
            Err(err) => return CueSetup::from_error(err),
        };

        cfg_if::cfg_if! {
            if #[cfg(target_os = "android")] {
                let _ = bank;
                log::warn!("[MetronomeHandle] No Android audio output bound, using silent cues");
                CueSetup::silent("no Android audio output bound")
            } else {
                match crate::engine::backend::CpalCues::start(bank) {
                    Ok(cues) => CueSetup::ready(Arc::new(cues)),
                    Err(err) => CueSetup::from_error(err),
                }
            }
        }
    }

    // ========================================================================
    // UI INPUT
    // ========================================================================

    pub fn set_tempo(&self, bpm: u32) -> Result<Tempo, SchedulerError> {
        self.scheduler.set_tempo(bpm)
    }

    pub fn set_grouping(&self, beats: u32) -> Result<Grouping, SchedulerError> {
        self.scheduler.set_grouping(beats)
    }

    pub fn toggle_play(&self) -> Result<PlayState, SchedulerError> {
        self.scheduler.toggle_play()
    }

    pub fn apply_patch(&self, patch: &SettingsPatch) -> Result<SchedulerSnapshot, SchedulerError> {
        self.scheduler.apply_patch(patch)
    }

    pub fn reconfigure(&self) -> Result<(), SchedulerError> {
        self.scheduler.reconfigure()
    }

    /// Stop playback if playing; no-op otherwise.
    pub fn stop(&self) -> Result<(), SchedulerError> {
        if self.snapshot()?.is_playing() {
            self.scheduler.toggle_play()?;
        }
        Ok(())
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    pub fn snapshot(&self) -> Result<SchedulerSnapshot, SchedulerError> {
        self.scheduler.snapshot()
    }

    pub fn subscribe_beats(&self) -> broadcast::Receiver<BeatEvent> {
        self.scheduler.subscribe_beats()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.scheduler.subscribe_events()
    }

    pub fn cue_status(&self) -> &CueStatus {
        &self.cue_status
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &BeatScheduler {
        &self.scheduler
    }
}

impl Drop for MetronomeHandle {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log_scheduler_error(&err, "MetronomeHandle::drop");
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests;
