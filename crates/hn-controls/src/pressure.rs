//! Worst-point pressure controller.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::settings::PressureControlSettings;
use crate::status::ConvergenceStatus;

/// Pump pressures proposed for the next iteration (bar).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpSetpoint {
    pub lift_bar: f64,
    pub flow_bar: f64,
}

/// Proportional pump control on the worst point's pressure differential.
///
/// Pump pressures are not clipped.
#[derive(Debug, Clone)]
pub struct PressureController {
    settings: PressureControlSettings,
    iteration: usize,
}

impl PressureController {
    pub fn new(settings: PressureControlSettings) -> Self {
        Self {
            settings,
            iteration: 0,
        }
    }

    pub fn settings(&self) -> &PressureControlSettings {
        &self.settings
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    fn bypassed(&self, worst_qext_w: f64) -> bool {
        worst_qext_w <= self.settings.bypass_w
    }

    pub fn status(&self, worst_qext_w: f64, current_dp_bar: f64) -> ConvergenceStatus {
        if self.bypassed(worst_qext_w) {
            ConvergenceStatus::Bypassed
        } else if (current_dp_bar - self.settings.target_dp_bar).abs() < self.settings.tolerance_bar
        {
            ConvergenceStatus::Converged
        } else {
            ConvergenceStatus::NotConverged
        }
    }

    /// Shift lift and flow pressure together by `gain · (target − dp)`.
    pub fn propose(
        &mut self,
        worst_qext_w: f64,
        current_dp_bar: f64,
        current: PumpSetpoint,
    ) -> PumpSetpoint {
        if self.bypassed(worst_qext_w) {
            return current;
        }
        self.iteration += 1;

        let error = self.settings.target_dp_bar - current_dp_bar;
        let delta = error * self.settings.gain;
        trace!(
            iteration = self.iteration,
            dp_bar = current_dp_bar,
            delta_bar = delta,
            "pump setpoint step"
        );

        PumpSetpoint {
            lift_bar: current.lift_bar + delta,
            flow_bar: current.flow_bar + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump() -> PumpSetpoint {
        PumpSetpoint {
            lift_bar: 1.5,
            flow_bar: 4.0,
        }
    }

    #[test]
    fn half_bar_short_raises_pump_by_a_tenth() {
        let mut ctrl = PressureController::new(PressureControlSettings::default());
        assert_eq!(ctrl.status(10_000.0, 0.5), ConvergenceStatus::NotConverged);

        let next = ctrl.propose(10_000.0, 0.5, pump());
        assert!((next.lift_bar - 1.6).abs() < 1e-12);
        assert!((next.flow_bar - 4.1).abs() < 1e-12);
        assert_eq!(ctrl.iteration(), 1);
    }

    #[test]
    fn excess_differential_lowers_pump() {
        let mut ctrl = PressureController::new(PressureControlSettings::default());
        let next = ctrl.propose(10_000.0, 2.0, pump());
        assert!(next.lift_bar < 1.5);
        assert!(next.flow_bar < 4.0);
    }

    #[test]
    fn within_tolerance_converges() {
        let ctrl = PressureController::new(PressureControlSettings::default());
        assert_eq!(ctrl.status(10_000.0, 0.85), ConvergenceStatus::Converged);
        assert_eq!(ctrl.status(10_000.0, 1.19), ConvergenceStatus::Converged);
        assert_eq!(ctrl.status(10_000.0, 1.25), ConvergenceStatus::NotConverged);
        assert_eq!(ctrl.status(10_000.0, 0.75), ConvergenceStatus::NotConverged);
    }

    #[test]
    fn tolerance_edge_is_exclusive() {
        let settings = PressureControlSettings::builder()
            .with_target_dp_bar(1.0)
            .with_tolerance_bar(0.5)
            .build()
            .unwrap();
        let ctrl = PressureController::new(settings);
        assert_eq!(ctrl.status(10_000.0, 1.5), ConvergenceStatus::NotConverged);
        assert_eq!(ctrl.status(10_000.0, 1.25), ConvergenceStatus::Converged);
    }

    #[test]
    fn low_demand_bypasses() {
        let mut ctrl = PressureController::new(PressureControlSettings::default());
        assert_eq!(ctrl.status(400.0, 0.1), ConvergenceStatus::Bypassed);
        assert_eq!(ctrl.propose(400.0, 0.1, pump()), pump());
        assert_eq!(ctrl.iteration(), 0);
    }
}
