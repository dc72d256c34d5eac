//! hn-results: run cache, hourly record storage and exports.

pub mod hash;
pub mod layers;
pub mod store;
pub mod summary;
pub mod types;

pub use hash::compute_run_id;
pub use layers::{layer_to_feature_collection, write_layers};
pub use store::{RunStore, now_timestamp};
pub use summary::{
    ConsumerRow, PumpSummaryRow, PumpTotals, consumer_rows, pump_summary, pump_totals,
    write_consumer_csv, write_pump_csv,
};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Corrupt run {run_id}: {what}")]
    Corrupt { run_id: String, what: String },
}
