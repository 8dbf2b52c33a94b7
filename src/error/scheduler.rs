// Beat scheduler error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Scheduler error code constants
///
/// Error code range: 2001-2003
pub struct SchedulerErrorCodes {}

impl SchedulerErrorCodes {
    /// Grouping is not one of the supported accent cycles
    pub const GROUPING_INVALID: i32 = 2001;

    /// Scheduler state lock was poisoned
    pub const LOCK_POISONED: i32 = 2002;

    /// Timer runtime could not be created or reached
    pub const RUNTIME_UNAVAILABLE: i32 = 2003;
}

/// Log a scheduler error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_scheduler_error(err: &SchedulerError, context: &str) {
    error!(
        "Scheduler error in {}: code={}, component=BeatScheduler, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Beat scheduler errors
///
/// Tempo values are clamped rather than rejected, so there is no tempo
/// variant here.
///
/// Error code ranges: 2001-2003
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// Grouping outside {2, 3, 4, 6, 8}
    GroupingInvalid { beats: u32 },

    /// Scheduler state Mutex was poisoned
    LockPoisoned { component: String },

    /// Tokio runtime could not be built or no runtime is active
    RuntimeUnavailable { reason: String },
}

impl ErrorCode for SchedulerError {
    fn code(&self) -> i32 {
        match self {
            SchedulerError::GroupingInvalid { .. } => SchedulerErrorCodes::GROUPING_INVALID,
            SchedulerError::LockPoisoned { .. } => SchedulerErrorCodes::LOCK_POISONED,
            SchedulerError::RuntimeUnavailable { .. } => SchedulerErrorCodes::RUNTIME_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            SchedulerError::GroupingInvalid { beats } => {
                format!("Grouping must be one of 2, 3, 4, 6, 8 (got {})", beats)
            }
            SchedulerError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            SchedulerError::RuntimeUnavailable { reason } => {
                format!("Scheduler runtime unavailable: {}", reason)
            }
        }
    }
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SchedulerError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SchedulerError {}
