//! Shared application service layer for heatnet.
//!
//! Frontends go through this crate for project loading, network generation,
//! cached simulation runs and result queries.

pub mod error;
pub mod network_service;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use error::{AppError, AppResult};
pub use network_service::{
    GenerateReport, SimSetup, build_network_handle, connection_points, export_layers,
    generate_network, pipe_catalog, prepare_simulation, sim_inputs, sim_options, street_layer,
};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{ProjectSummary, load_project, save_project, summarize, validate_project};
pub use query::{RunSummary, consumer_series, get_run_summary};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    list_runs, load_run,
};
