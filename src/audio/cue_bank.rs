//! Cue bank: the two preloaded samples the metronome replays.
//!
//! Cues are loaded once at startup, either from WAV assets or synthesized,
//! and shared read-only with the output stream afterwards.

use std::path::Path;
use std::sync::Arc;

use crate::audio::click::{generate_click_sample, ACCENT_CLICK_SEED, REGULAR_CLICK_SEED};
use crate::config::CueConfig;
use crate::error::AudioError;

/// A mono sample buffer at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct CueSample {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl CueSample {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Convert to another sample rate with linear interpolation.
    ///
    /// A sample without a known rate (0) is relabelled, not interpolated.
    pub fn resampled(&self, target_rate: u32) -> Self {
        if target_rate == self.sample_rate
            || self.samples.is_empty()
            || target_rate == 0
            || self.sample_rate == 0
        {
            return Self {
                samples: Arc::clone(&self.samples),
                sample_rate: if target_rate == 0 {
                    self.sample_rate
                } else {
                    target_rate
                },
            };
        }

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = ((self.samples.len() as f64) / ratio).round().max(1.0) as usize;
        let last = self.samples.len() - 1;

        let mut out = Vec::with_capacity(out_len);
        for i in 0..out_len {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            out.push(self.samples[idx] + (self.samples[next] - self.samples[idx]) * frac);
        }

        Self::new(out, target_rate)
    }
}

/// The regular and accent cue samples.
#[derive(Debug, Clone, PartialEq)]
pub struct CueBank {
    pub regular: CueSample,
    pub accent: CueSample,
}

impl CueBank {
    /// Load both cues according to the configuration.
    ///
    /// A cue with a configured path is read from that WAV file and resampled
    /// to `config.sample_rate`; a cue without one is synthesized.
    ///
    /// # Errors
    /// `AudioError::CueLoadFailed` if a configured file cannot be opened,
    /// has an unsupported format or contains no samples.
    pub fn load(config: &CueConfig) -> Result<Self, AudioError> {
        let synthesized = Self::synthesize(config);

        let regular = match &config.regular_path {
            Some(path) => read_wav("regular", path)?.resampled(config.sample_rate),
            None => synthesized.regular,
        };
        let accent = match &config.accent_path {
            Some(path) => read_wav("accent", path)?.resampled(config.sample_rate),
            None => synthesized.accent,
        };

        log::info!(
            "[CueBank] Loaded cues: regular={} frames, accent={} frames @ {} Hz",
            regular.len(),
            accent.len(),
            config.sample_rate
        );

        Ok(Self { regular, accent })
    }

    /// Build both cues from noise bursts; the accent is longer and louder.
    pub fn synthesize(config: &CueConfig) -> Self {
        let regular = generate_click_sample(
            config.sample_rate,
            config.click_duration_ms,
            config.click_gain,
            REGULAR_CLICK_SEED,
        );
        let accent = generate_click_sample(
            config.sample_rate,
            config.accent_duration_ms,
            config.accent_gain,
            ACCENT_CLICK_SEED,
        );

        Self {
            regular: CueSample::new(regular, config.sample_rate),
            accent: CueSample::new(accent, config.sample_rate),
        }
    }

    /// Both cues converted to the output device's sample rate.
    pub fn resampled(&self, target_rate: u32) -> Self {
        Self {
            regular: self.regular.resampled(target_rate),
            accent: self.accent.resampled(target_rate),
        }
    }
}

fn read_wav(cue: &str, path: &Path) -> Result<CueSample, AudioError> {
    let load_err = |reason: String| AudioError::CueLoadFailed {
        cue: cue.to_string(),
        reason,
    };

    let mut reader = hound::WavReader::open(path)
        .map_err(|err| load_err(format!("failed to open {}: {err}", path.display())))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(load_err(format!("{} has zero channels", path.display())));
    }
    if spec.sample_rate == 0 {
        return Err(load_err(format!("{} has a zero sample rate", path.display())));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| {
                sample.map_err(|err| load_err(format!("error reading {}: {err}", path.display())))
            })
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|sample| {
                    sample
                        .map(|v| v as f32 / i16::MAX as f32)
                        .map_err(|err| load_err(format!("error reading {}: {err}", path.display())))
                })
                .collect::<Result<Vec<f32>, _>>()?,
            24 | 32 => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample.map(|v| v as f32 / scale).map_err(|err| {
                            load_err(format!("error reading {}: {err}", path.display()))
                        })
                    })
                    .collect::<Result<Vec<f32>, _>>()?
            }
            bits => {
                return Err(load_err(format!(
                    "unsupported bits_per_sample={} for {}",
                    bits,
                    path.display()
                )))
            }
        },
    };

    let mono = if spec.channels == 1 {
        samples
    } else {
        samples
            .chunks(spec.channels as usize)
            .map(|chunk| chunk.iter().copied().sum::<f32>() / spec.channels as f32)
            .collect()
    };

    if mono.is_empty() {
        return Err(load_err(format!("{} contains no samples", path.display())));
    }

    Ok(CueSample::new(mono, spec.sample_rate))
}
