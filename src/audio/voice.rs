//! Lock-free cue voices shared between the cue triggers and the audio callback.
//!
//! Triggering a voice only stores its play position back to zero, so it is
//! safe to call from any thread and never waits on the audio callback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::audio::cue_bank::{CueBank, CueSample};

/// One replayable sample with an atomic play position.
///
/// A position equal to the sample length means the voice is idle.
pub struct Voice {
    samples: Arc<[f32]>,
    position: AtomicUsize,
}

impl Voice {
    pub fn new(sample: &CueSample) -> Self {
        let samples = Arc::clone(sample.samples());
        let idle = samples.len();
        Self {
            samples,
            position: AtomicUsize::new(idle),
        }
    }

    /// Restart playback from the first frame, cutting off any playback in progress.
    pub fn trigger(&self) {
        self.position.store(0, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.position.load(Ordering::Acquire) < self.samples.len()
    }

    /// Mix the next frames of this voice into an interleaved output buffer.
    ///
    /// Every channel of a frame receives the same mono sample. If the voice is
    /// re-triggered while rendering, the newer position wins.
    pub fn mix_into(&self, output: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let start = self.position.load(Ordering::Acquire);
        let len = self.samples.len();
        if start >= len {
            return;
        }

        let frames = output.len() / channels;
        let count = frames.min(len - start);
        for (frame, &sample) in output
            .chunks_mut(channels)
            .zip(&self.samples[start..start + count])
        {
            for out in frame.iter_mut() {
                *out += sample;
            }
        }

        let _ = self.position.compare_exchange(
            start,
            start + count,
            Ordering::AcqRel,
            Ordering::Relaxed,
        );
    }
}

/// The regular and accent voices of a cue bank.
pub struct CueVoices {
    pub regular: Voice,
    pub accent: Voice,
}

impl CueVoices {
    pub fn new(bank: &CueBank) -> Self {
        Self {
            regular: Voice::new(&bank.regular),
            accent: Voice::new(&bank.accent),
        }
    }

    /// Render both voices into a zeroed-then-mixed output buffer, clamped to [-1, 1].
    pub fn render(&self, output: &mut [f32], channels: usize) {
        output.fill(0.0);
        self.regular.mix_into(output, channels);
        self.accent.mix_into(output, channels);
        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}
