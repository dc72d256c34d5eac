//! Error types for solver operations.

use hn_components::ComponentError;
use hn_core::HnError;
use hn_graph::GraphError;
use thiserror::Error;

/// Errors that can occur while setting up or equilibrating a network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for HnError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { what } => HnError::Setup { what },
            SolverError::Graph(g) => g.into(),
            SolverError::Component(c) => c.into(),
            SolverError::InvalidState { what } | SolverError::Numeric { what } => {
                HnError::Invariant { what }
            }
        }
    }
}
