//! Per-consumer return-temperature controller.

use hn_components::MassFlowBounds;
use hn_core::units::constants::CP_WATER_J_PER_KG_K;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pid::PidState;
use crate::settings::ReturnTemperatureSettings;
use crate::status::{ConvergenceStatus, LimitSide};

/// Stand-in for a zero temperature difference in the heat balance (K).
const MIN_DELTA_T_K: f64 = 0.1;

const INLET_HISTORY: usize = 2;

/// Consumer temperatures reported by the solver (°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureObservation {
    pub inlet_c: f64,
    pub outlet_c: f64,
}

/// Which flow limit the consumer ended the previous hour on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitBias {
    pub at_min: bool,
    pub at_max: bool,
}

impl LimitBias {
    /// Initial flow for a new hour: step off the limit, else keep `previous`.
    pub fn seed(&self, bounds: &MassFlowBounds, previous: f64) -> f64 {
        let seeded = if self.at_min {
            bounds.min_kg_s * 1.05
        } else if self.at_max {
            bounds.max_kg_s * 0.95
        } else {
            previous
        };
        bounds.clamp(seeded)
    }
}

/// PID on the consumer's return temperature, acting through its mass flow.
///
/// One instance covers one simulated hour.
#[derive(Debug, Clone)]
pub struct ReturnTemperatureController {
    settings: ReturnTemperatureSettings,
    bounds: MassFlowBounds,
    qext_w: f64,
    target_c: f64,
    min_supply_c: Option<f64>,
    pid: PidState,
    supply_pid: PidState,
    iteration: usize,
    inlet_history: Vec<f64>,
    limit_hold: usize,
    bias: LimitBias,
    mass_flow: f64,
}

impl ReturnTemperatureController {
    /// Start an hour with demand `qext_w` and return-temperature target `target_c`.
    pub fn for_hour(
        settings: ReturnTemperatureSettings,
        bounds: MassFlowBounds,
        qext_w: f64,
        target_c: f64,
        previous_mass_flow: f64,
        bias: LimitBias,
    ) -> Self {
        let mut ctrl = Self {
            settings,
            bounds,
            qext_w,
            target_c,
            min_supply_c: None,
            pid: PidState::default(),
            supply_pid: PidState::default(),
            iteration: 0,
            inlet_history: Vec::with_capacity(INLET_HISTORY + 1),
            limit_hold: 0,
            bias,
            mass_flow: bias.seed(&bounds, previous_mass_flow),
        };
        if ctrl.bypassed() {
            ctrl.mass_flow = bounds.min_kg_s;
        }
        ctrl
    }

    pub fn with_min_supply_c(mut self, min_supply_c: Option<f64>) -> Self {
        self.min_supply_c = min_supply_c;
        self
    }

    pub fn mass_flow(&self) -> f64 {
        self.mass_flow
    }

    pub fn target_c(&self) -> f64 {
        self.target_c
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn bounds(&self) -> &MassFlowBounds {
        &self.bounds
    }

    pub fn qext_w(&self) -> f64 {
        self.qext_w
    }

    /// Limit flags to hand to the next hour.
    pub fn bias(&self) -> LimitBias {
        self.bias
    }

    /// Whether `inlet_c` meets the consumer's minimum supply temperature.
    pub fn supply_met(&self, inlet_c: f64) -> bool {
        self.min_supply_c.is_none_or(|min| inlet_c >= min)
    }

    fn bypassed(&self) -> bool {
        self.qext_w <= self.settings.bypass_w
    }

    /// Minimum supply temperature still to be reached at `inlet_c`, if enforced.
    fn supply_shortfall(&self, inlet_c: f64) -> Option<f64> {
        if !self.settings.min_supply_control {
            return None;
        }
        self.min_supply_c
            .filter(|min| inlet_c < *min)
    }

    /// Linearly weighted mean of the recent inlets, newest heaviest.
    fn inlet_reference(&self) -> Option<f64> {
        if self.inlet_history.is_empty() {
            return None;
        }
        let (sum, weights) = self
            .inlet_history
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sum, weights), (i, t)| {
                let w = (i + 1) as f64;
                (sum + w * t, weights + w)
            });
        Some(sum / weights)
    }

    /// Record solver output and decide whether this consumer is done.
    pub fn observe(&mut self, obs: TemperatureObservation) -> ConvergenceStatus {
        if self.bypassed() {
            return ConvergenceStatus::Bypassed;
        }

        let tol = self.settings.tolerance_k;
        let inlet_stable = self
            .inlet_history
            .last()
            .is_some_and(|prev| (obs.inlet_c - prev).abs() < tol);
        let outlet_on_target = (obs.outlet_c - self.target_c).abs() < tol;

        self.inlet_history.push(obs.inlet_c);
        if self.inlet_history.len() > INLET_HISTORY {
            self.inlet_history.remove(0);
        }

        self.bias = LimitBias {
            at_min: self.mass_flow <= self.bounds.min_kg_s,
            at_max: self.mass_flow >= self.bounds.max_kg_s,
        };
        if self.bias.at_min || self.bias.at_max {
            self.limit_hold += 1;
        } else {
            self.limit_hold = 0;
        }

        if self.limit_hold > self.settings.limit_hold_iterations {
            let side = if self.bias.at_min {
                LimitSide::Min
            } else {
                LimitSide::Max
            };
            debug!(?side, mass_flow = self.mass_flow, "mass-flow limit held");
            return ConvergenceStatus::LimitReached(side);
        }
        if inlet_stable && outlet_on_target && self.supply_shortfall(obs.inlet_c).is_none() {
            return ConvergenceStatus::Converged;
        }
        if self.iteration >= self.settings.max_iterations {
            return ConvergenceStatus::IterationCap;
        }
        ConvergenceStatus::NotConverged
    }

    /// Next mass flow (kg/s), always inside the bounds.
    pub fn propose(&mut self, obs: TemperatureObservation) -> f64 {
        if self.bypassed() {
            self.mass_flow = self.bounds.min_kg_s;
            return self.mass_flow;
        }
        self.iteration += 1;

        let inlet = self.inlet_reference().unwrap_or(obs.inlet_c);
        if let Some(min_supply) = self.supply_shortfall(inlet) {
            return self.raise_toward_supply(min_supply, inlet, obs.outlet_c);
        }
        if inlet == self.target_c {
            self.target_c += self.settings.equal_inlet_nudge_k;
        }
        if let Some(approach) = self.settings.min_approach_k {
            if inlet - self.target_c < approach {
                self.target_c = inlet - approach;
            }
        }

        let error = self.target_c - obs.outlet_c;
        let (pid, output) = self.settings.gains.update(&self.pid, error);
        self.pid = pid;

        let delta_t = nonzero(inlet - obs.outlet_c);
        let adjusted_delta_t = nonzero(inlet - (obs.outlet_c + output));
        let demand_flow = |dt: f64| self.qext_w / (CP_WATER_J_PER_KG_K * dt);

        // First pass: the carried-over flow belongs to another hour
        let raw = if self.iteration == 1 {
            demand_flow(adjusted_delta_t)
        } else {
            self.mass_flow + demand_flow(adjusted_delta_t) - demand_flow(delta_t)
        };
        if !raw.is_finite() {
            return self.mass_flow;
        }

        if raw >= self.bounds.max_kg_s {
            if let Some(step) = self.settings.relax_step_k {
                self.target_c -= step;
                debug!(target_c = self.target_c, "target relaxed at maximum flow");
            }
        }

        self.mass_flow = self.bounds.clamp(raw);
        self.mass_flow
    }

    /// Inlet below the minimum supply: scale flow up by the PID output
    /// relative to the supply-to-return spread.
    fn raise_toward_supply(&mut self, min_supply_c: f64, inlet_c: f64, outlet_c: f64) -> f64 {
        let error = min_supply_c - inlet_c;
        let (pid, output) = self.settings.gains.update(&self.supply_pid, error);
        self.supply_pid = pid;

        let raw = self.mass_flow * (1.0 + output / nonzero(min_supply_c - outlet_c).abs());
        if raw.is_finite() {
            self.mass_flow = self.bounds.clamp(raw.max(self.mass_flow));
        }
        debug!(
            inlet_c,
            min_supply_c,
            mass_flow = self.mass_flow,
            "minimum supply temperature not met"
        );
        self.mass_flow
    }
}

fn nonzero(delta_t: f64) -> f64 {
    if delta_t == 0.0 { MIN_DELTA_T_K } else { delta_t }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> MassFlowBounds {
        MassFlowBounds {
            min_kg_s: 0.003,
            max_kg_s: 0.6,
        }
    }

    fn obs(inlet_c: f64, outlet_c: f64) -> TemperatureObservation {
        TemperatureObservation { inlet_c, outlet_c }
    }

    fn controller(qext_w: f64) -> ReturnTemperatureController {
        ReturnTemperatureController::for_hour(
            ReturnTemperatureSettings::default(),
            bounds(),
            qext_w,
            60.0,
            0.1,
            LimitBias::default(),
        )
    }

    #[test]
    fn first_iteration_sets_flow_from_heat_balance() {
        let mut ctrl = controller(1000.0);
        let mdot = ctrl.propose(obs(80.0, 60.0));
        assert!((mdot - 1000.0 / (4190.0 * 20.0)).abs() < 1e-12);
        assert!((mdot - 0.01193).abs() < 1e-5);
    }

    #[test]
    fn low_demand_runs_at_minimum_and_converges() {
        let mut ctrl = controller(500.0);
        assert_eq!(ctrl.mass_flow(), 0.003);
        assert_eq!(ctrl.observe(obs(80.0, 79.0)), ConvergenceStatus::Bypassed);
        assert_eq!(ctrl.propose(obs(80.0, 79.0)), 0.003);
        assert_eq!(ctrl.iteration(), 0);
    }

    #[test]
    fn hot_return_reduces_flow() {
        let mut ctrl = controller(20_000.0);
        let first = ctrl.propose(obs(80.0, 60.0));
        ctrl.observe(obs(80.0, 65.0));
        let second = ctrl.propose(obs(80.0, 65.0));
        assert!(second < first, "{second} !< {first}");
    }

    #[test]
    fn target_kept_below_inlet() {
        let mut ctrl = controller(20_000.0);
        ctrl.propose(obs(70.0, 50.0));
        assert!((ctrl.target_c() - 55.0).abs() < 1e-12);
    }

    #[test]
    fn equal_inlet_nudges_target() {
        let settings = ReturnTemperatureSettings::builder()
            .without_min_approach()
            .build()
            .unwrap();
        let mut ctrl = ReturnTemperatureController::for_hour(
            settings,
            bounds(),
            20_000.0,
            60.0,
            0.1,
            LimitBias::default(),
        );
        ctrl.propose(obs(60.0, 55.0));
        assert!((ctrl.target_c() - 60.1).abs() < 1e-12);
    }

    #[test]
    fn converges_on_stable_inlet_and_target_outlet() {
        let mut ctrl = controller(20_000.0);
        assert_eq!(ctrl.observe(obs(80.0, 60.5)), ConvergenceStatus::NotConverged);
        ctrl.propose(obs(80.0, 60.5));
        assert_eq!(ctrl.observe(obs(80.3, 60.5)), ConvergenceStatus::Converged);
    }

    #[test]
    fn held_at_limit_reports_limit_reached() {
        let mut ctrl = controller(200_000.0);
        let mut status = ConvergenceStatus::NotConverged;
        for _ in 0..12 {
            ctrl.propose(obs(80.0, 40.0));
            status = ctrl.observe(obs(80.0, 40.0));
            if status.is_settled() {
                break;
            }
        }
        assert_eq!(status, ConvergenceStatus::LimitReached(LimitSide::Max));
        assert!(ctrl.bias().at_max);
    }

    #[test]
    fn limit_settles_on_the_observation_after_the_hold() {
        let mut ctrl = controller(200_000.0);
        ctrl.propose(obs(80.0, 40.0));
        for _ in 0..ReturnTemperatureSettings::default().limit_hold_iterations {
            assert_eq!(ctrl.observe(obs(80.0, 40.0)), ConvergenceStatus::NotConverged);
            ctrl.propose(obs(80.0, 40.0));
        }
        assert_eq!(
            ctrl.observe(obs(80.0, 40.0)),
            ConvergenceStatus::LimitReached(LimitSide::Max)
        );
    }

    #[test]
    fn max_bias_seeds_below_limit() {
        let bias = LimitBias {
            at_min: false,
            at_max: true,
        };
        let ctrl = ReturnTemperatureController::for_hour(
            ReturnTemperatureSettings::default(),
            bounds(),
            20_000.0,
            60.0,
            0.6,
            bias,
        );
        assert!((ctrl.mass_flow() - 0.57).abs() < 1e-12);
        assert!((bias.seed(&bounds(), 0.2) - 0.57).abs() < 1e-12);
        assert!((LimitBias { at_min: true, at_max: false }.seed(&bounds(), 0.2) - 0.00315).abs() < 1e-12);
    }

    #[test]
    fn relaxation_lowers_target_at_max_flow() {
        let settings = ReturnTemperatureSettings::builder()
            .with_relax_step_k(1.0)
            .build()
            .unwrap();
        let mut ctrl = ReturnTemperatureController::for_hour(
            settings,
            bounds(),
            200_000.0,
            60.0,
            0.1,
            LimitBias::default(),
        );
        ctrl.propose(obs(80.0, 70.0));
        assert_eq!(ctrl.mass_flow(), 0.6);
        assert!((ctrl.target_c() - 59.0).abs() < 1e-12);
    }

    #[test]
    fn cold_inlet_raises_flow_and_blocks_convergence() {
        let settings = ReturnTemperatureSettings::builder()
            .with_min_supply_control(true)
            .build()
            .unwrap();
        let mut ctrl = ReturnTemperatureController::for_hour(
            settings,
            bounds(),
            20_000.0,
            40.0,
            0.1,
            LimitBias::default(),
        )
        .with_min_supply_c(Some(70.0));

        let before = ctrl.mass_flow();
        let raised = ctrl.propose(obs(65.0, 40.0));
        assert!(raised > before, "{raised} !> {before}");
        assert!(raised <= bounds().max_kg_s);
        assert_eq!(ctrl.target_c(), 40.0);

        assert_eq!(ctrl.observe(obs(65.0, 40.0)), ConvergenceStatus::NotConverged);
        assert_eq!(ctrl.observe(obs(65.5, 40.5)), ConvergenceStatus::NotConverged);

        ctrl.propose(obs(75.0, 40.0));
        assert_eq!(ctrl.observe(obs(75.0, 40.0)), ConvergenceStatus::NotConverged);
        assert_eq!(ctrl.observe(obs(75.5, 40.5)), ConvergenceStatus::Converged);
    }

    #[test]
    fn cold_inlet_only_flagged_without_supply_control() {
        let mut ctrl = controller(20_000.0).with_min_supply_c(Some(90.0));
        ctrl.observe(obs(80.0, 60.5));
        ctrl.propose(obs(80.0, 60.5));
        assert_eq!(ctrl.observe(obs(80.3, 60.5)), ConvergenceStatus::Converged);
        assert!(!ctrl.supply_met(80.3));
    }

    #[test]
    fn supply_flag() {
        let ctrl = controller(20_000.0).with_min_supply_c(Some(65.0));
        assert!(ctrl.supply_met(70.0));
        assert!(!ctrl.supply_met(64.9));
        assert!(controller(20_000.0).supply_met(10.0));
    }
}
