//! Error types for the hn-app service layer.

use std::path::PathBuf;

/// Unified error for every frontend; backend errors are flattened to text.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Network generation failed: {0}")]
    Network(String),

    #[error("Component error: {0}")]
    Component(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<hn_project::ProjectError> for AppError {
    fn from(err: hn_project::ProjectError) -> Self {
        match err {
            hn_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<hn_project::ValidationError> for AppError {
    fn from(err: hn_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<hn_graph::GraphError> for AppError {
    fn from(err: hn_graph::GraphError) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<hn_netgen::NetgenError> for AppError {
    fn from(err: hn_netgen::NetgenError) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<hn_components::ComponentError> for AppError {
    fn from(err: hn_components::ComponentError) -> Self {
        AppError::Component(err.to_string())
    }
}

impl From<hn_solver::SolverError> for AppError {
    fn from(err: hn_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<hn_sim::SimError> for AppError {
    fn from(err: hn_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<hn_results::ResultsError> for AppError {
    fn from(err: hn_results::ResultsError) -> Self {
        match err {
            hn_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
