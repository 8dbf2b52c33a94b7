// Metronome Core - Beat Scheduler
// Tempo-driven tick generation with accented grouping and low-latency cues

// Module declarations
pub mod api;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;

// Re-exports for convenience
pub use api::*;
pub use engine::{BeatEvent, BeatKind, MetronomeHandle, SchedulerSnapshot};

/// Install the fmt subscriber for `tracing` and `log` output.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}
