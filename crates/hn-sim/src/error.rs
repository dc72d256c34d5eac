//! Error types for simulation runs.

use thiserror::Error;

/// Errors that abort a run. Non-convergence never does.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Schedule error: {what}")]
    Schedule { what: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hn_solver::SolverError> for SimError {
    fn from(e: hn_solver::SolverError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<hn_controls::ControlError> for SimError {
    fn from(e: hn_controls::ControlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<hn_core::HnError> for SimError {
    fn from(e: hn_core::HnError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
