//! Convergence controllers for hourly hydraulic-thermal simulation.
//!
//! Two controllers steer the network toward a feasible operating point:
//!
//! - [`PressureController`] raises or lowers the pump so the worst-point
//!   consumer keeps a minimum pressure differential
//! - [`ReturnTemperatureController`] sets each consumer's mass flow so its
//!   return temperature meets a target, inside velocity-derived bounds
//!
//! Controllers never touch the network. They observe solver output and
//! propose setpoints; the orchestrator applies them as one batched update.
//! A controller instance lives for exactly one simulated hour; the only
//! state carried across hours is the [`LimitBias`] hint.

pub mod error;
pub mod pid;
pub mod pressure;
pub mod return_temp;
pub mod settings;
pub mod status;

pub use error::{ControlError, ControlResult};
pub use pid::{PidGains, PidState};
pub use pressure::{PressureController, PumpSetpoint};
pub use return_temp::{LimitBias, ReturnTemperatureController, TemperatureObservation};
pub use settings::{
    PressureControlSettings, PressureControlSettingsBuilder, ReturnTemperatureSettings,
    ReturnTemperatureSettingsBuilder,
};
pub use status::{ConvergenceStatus, LimitSide};
