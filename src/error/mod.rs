// Error types for the metronome core
//
// This module defines custom error types for audio cue and beat scheduler
// operations, providing structured error handling with stable error codes
// that UI bindings can match on.

mod audio;
mod scheduler;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use scheduler::{log_scheduler_error, SchedulerError, SchedulerErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the UI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_trait_objects() {
        let audio_err: &dyn ErrorCode = &AudioError::StreamOpenFailed {
            reason: "no device".to_string(),
        };
        assert_eq!(audio_err.code(), AudioErrorCodes::STREAM_OPEN_FAILED);

        let scheduler_err: &dyn ErrorCode = &SchedulerError::GroupingInvalid { beats: 5 };
        assert_eq!(scheduler_err.code(), SchedulerErrorCodes::GROUPING_INVALID);
    }

    #[test]
    fn test_error_code_ranges_do_not_overlap() {
        let audio = [
            AudioErrorCodes::CUE_LOAD_FAILED,
            AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioErrorCodes::HARDWARE_ERROR,
            AudioErrorCodes::STREAM_FAILURE,
        ];
        let scheduler = [
            SchedulerErrorCodes::GROUPING_INVALID,
            SchedulerErrorCodes::LOCK_POISONED,
            SchedulerErrorCodes::RUNTIME_UNAVAILABLE,
        ];

        assert!(audio.iter().all(|code| (1001..2000).contains(code)));
        assert!(scheduler.iter().all(|code| (2001..3000).contains(code)));
    }
}
