//! Error types for controller configuration.

use hn_core::HnError;
use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while configuring controllers.
///
/// Running controllers never fail: non-convergence and flow limits are
/// reported through [`crate::ConvergenceStatus`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a controller.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A setting outside its admissible range.
    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: f64 },
}

impl From<ControlError> for HnError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::InvalidArg { what } => HnError::InvalidArg { what },
            ControlError::InvalidSetting { name, .. } => HnError::InvalidArg { what: name },
        }
    }
}
