// Audio module - cue samples, voices and the desktop output stream

pub mod click;
pub mod cue_bank;
#[cfg(not(target_os = "android"))]
pub mod engine_cpal;
pub mod voice;

// Re-export commonly used types for convenience
pub use cue_bank::{CueBank, CueSample};
#[cfg(not(target_os = "android"))]
pub use engine_cpal::CueOutput;
pub use voice::{CueVoices, Voice};
