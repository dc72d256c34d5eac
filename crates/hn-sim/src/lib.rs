//! Hourly hydraulic-thermal simulation.
//!
//! Provides:
//! - per-hour orchestration of the pressure and return-temperature
//!   controllers against a [`hn_solver::HydraulicSolver`]
//! - hourly demand and temperature schedules
//! - worst-point nomination
//! - sequential and chunk-parallel runs

pub mod error;
pub mod orchestrator;
pub mod record;
pub mod schedule;
pub mod sim;

pub use error::{SimError, SimResult};
pub use orchestrator::{HourCarry, nominate_worst_point, simulate_hour};
pub use record::{ConsumerRecord, HourRecord, PumpRecord, SimRecord};
pub use schedule::{ConsumerSchedule, SimInputs};
pub use sim::{SimOptions, SimProgress, run_sim, run_sim_parallel, run_sim_with_progress};
