//! CPAL-based cue backend for desktop platforms (Linux, macOS, Windows)
//!
//! Thin adapter from the scheduler's [`AudioCues`] trait to the
//! [`CueOutput`] stream owner.

use crate::audio::{CueBank, CueOutput};
use crate::error::AudioError;

use super::AudioCues;

/// CPAL-based cue player that delegates to [`CueOutput`]
pub struct CpalCues {
    output: CueOutput,
}

impl CpalCues {
    /// Open the default output device with the given cue bank.
    pub fn start(bank: CueBank) -> Result<Self, AudioError> {
        Ok(Self {
            output: CueOutput::start(bank)?,
        })
    }
}

impl AudioCues for CpalCues {
    fn play_regular(&self) {
        self.output.voices().regular.trigger();
    }

    fn play_accent(&self) {
        self.output.voices().accent.trigger();
    }
}
