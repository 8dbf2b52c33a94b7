//! Click synthesis - deterministic noise bursts for the metronome cues
//!
//! Used when no WAV asset is configured for a cue. Key features:
//! - Fixed-seed white noise, so every run produces identical samples
//! - Linear decay envelope to avoid a hard cut at the end of the burst
//! - Pure functions (no side effects, deterministic output)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed for the regular click noise
pub const REGULAR_CLICK_SEED: u64 = 42;
/// Seed for the accent click noise
pub const ACCENT_CLICK_SEED: u64 = 7;

/// Number of frames covering `duration_ms` at `sample_rate`.
#[inline]
pub fn duration_frames(sample_rate: u32, duration_ms: f32) -> usize {
    (sample_rate as f32 * duration_ms / 1000.0) as usize
}

/// Generates a metronome click sample (white noise burst with linear decay).
///
/// # Arguments
/// * `sample_rate` - Sample rate in Hz (typically 48000)
/// * `duration_ms` - Burst length in milliseconds
/// * `gain` - Peak amplitude, clamped to [0.0, 1.0]
/// * `seed` - Noise seed; the same seed always yields the same samples
///
/// # Returns
/// Exactly `duration_frames(sample_rate, duration_ms)` samples in
/// [-gain, gain].
///
/// # Examples
/// ```
/// use metronome::audio::click::generate_click_sample;
/// let click = generate_click_sample(48000, 20.0, 0.5, 42);
/// assert_eq!(click.len(), 960);
/// ```
pub fn generate_click_sample(sample_rate: u32, duration_ms: f32, gain: f32, seed: u64) -> Vec<f32> {
    let num_samples = duration_frames(sample_rate, duration_ms);
    let gain = gain.clamp(0.0, 1.0);

    let mut rng = StdRng::seed_from_u64(seed);

    let mut samples = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let envelope = 1.0 - i as f32 / num_samples as f32;
        let noise: f32 = rng.gen_range(-1.0..1.0);
        samples.push(noise * gain * envelope);
    }

    samples
}

/// Peak absolute amplitude of a sample buffer.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}
