//! CueOutput - CPAL output stream replaying the metronome cues
//!
//! `cpal::Stream` is not `Send` on every platform, so the stream is built,
//! played and dropped on a dedicated thread. The rest of the crate only
//! touches the shared [`CueVoices`], whose triggers are lock-free.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use super::cue_bank::CueBank;
use super::voice::CueVoices;
use crate::error::AudioError;

/// Running output stream and the voices it renders.
///
/// Dropping the output stops the stream and joins its thread.
pub struct CueOutput {
    voices: Arc<CueVoices>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CueOutput {
    /// Open the default output device and start rendering the cue bank.
    ///
    /// Blocks until the stream is playing or failed to open.
    pub fn start(bank: CueBank) -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Arc<CueVoices>, AudioError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("metronome-cue-output".to_string())
            .spawn(move || {
                let (stream, voices) = match create_output_stream(&bank) {
                    Ok(opened) => opened,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(AudioError::HardwareError {
                        details: format!("Output start failed: {}", e),
                    }));
                    return;
                }

                let _ = ready_tx.send(Ok(voices));

                // Park until the owner drops its sender.
                let _ = shutdown_rx.recv();
                drop(stream);
                log::debug!("[CueOutput] Output stream closed");
            })?;

        let voices = ready_rx.recv().map_err(|_| AudioError::StreamFailure {
            reason: "cue output thread exited before reporting".to_string(),
        })??;

        Ok(Self {
            voices,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn voices(&self) -> &Arc<CueVoices> {
        &self.voices
    }
}

impl Drop for CueOutput {
    fn drop(&mut self) {
        drop(self.shutdown_tx.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn create_output_stream(bank: &CueBank) -> Result<(cpal::Stream, Arc<CueVoices>), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::StreamOpenFailed {
            reason: "No default output device found".to_string(),
        })?;

    let config = device
        .default_output_config()
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("Failed to get default output config: {:?}", e),
        })?;

    let stream_config: cpal::StreamConfig = config.clone().into();
    let channels_count = stream_config.channels as usize;

    // Cues are rendered at the device rate, not the configured one.
    let voices = Arc::new(CueVoices::new(&bank.resampled(stream_config.sample_rate.0)));
    let render_voices = Arc::clone(&voices);

    let err_fn = |err| log::error!("[CueOutput] Output stream error: {}", err);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                render_voices.render(data, channels_count);
            },
            err_fn,
            None,
        ),
        _ => {
            return Err(AudioError::StreamOpenFailed {
                reason: "Only F32 sample format is currently supported for output".to_string(),
            })
        }
    }
    .map_err(|e| AudioError::StreamOpenFailed {
        reason: format!("{:?}", e),
    })?;

    log::info!(
        "[CueOutput] Opened output stream: {} Hz, {} channel(s)",
        stream_config.sample_rate.0,
        channels_count
    );

    Ok((stream, voices))
}
