//! Per-hour convergence loop.
//!
//! `Init` builds fresh controllers from the carried state, then the loop
//! alternates one solver evaluation with one batch of controller proposals
//! until every controller settles or the iteration cap is hit. `Commit`
//! records the last evaluation and hands flows, limit flags and pump
//! pressures to the next hour.

use hn_controls::{
    ConvergenceStatus, LimitBias, PressureController, PumpSetpoint, ReturnTemperatureController,
    TemperatureObservation,
};
use hn_core::units::constants::CP_WATER_J_PER_KG_K;
use hn_core::{celsius_to_kelvin, kelvin_to_celsius};
use hn_solver::{BoundaryConditions, HydraulicSolver, NetworkHandle};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::record::{ConsumerRecord, HourRecord, PumpRecord};
use crate::schedule::SimInputs;
use crate::sim::SimOptions;

/// State handed from one committed hour to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct HourCarry {
    pub mass_flow: Vec<f64>,
    pub bias: Vec<LimitBias>,
    pub pump: PumpSetpoint,
}

impl HourCarry {
    /// Starting point for `hour`: design flows from the hour's demand and the
    /// spread between supply and return target, pump at its setpoints.
    pub fn initial(
        network: &NetworkHandle,
        inputs: &SimInputs,
        options: &SimOptions,
        hour: usize,
    ) -> Self {
        let pump = network.pump();
        let supply_c = inputs
            .supply_temperature_c(hour)
            .unwrap_or(pump.supply_temperature_c);
        let mass_flow = network
            .consumers()
            .iter()
            .enumerate()
            .map(|(i, site)| {
                let target = inputs
                    .target_return_c(i, hour)
                    .unwrap_or(options.return_temperature.target_return_c);
                let spread = (supply_c - target).max(1.0);
                let bounds = site.consumer.bounds(&options.return_temperature.envelope);
                bounds.clamp(inputs.consumers[i].qext_w[hour] / (CP_WATER_J_PER_KG_K * spread))
            })
            .collect();

        Self {
            mass_flow,
            bias: vec![LimitBias::default(); network.consumer_count()],
            pump: PumpSetpoint {
                lift_bar: pump.lift_bar,
                flow_bar: pump.flow_bar,
            },
        }
    }
}

fn supply_temperature_k(network: &NetworkHandle, inputs: &SimInputs, hour: usize) -> f64 {
    celsius_to_kelvin(
        inputs
            .supply_temperature_c(hour)
            .unwrap_or(network.pump().supply_temperature_c),
    )
}

/// Consumer with the lowest pressure differential under the starting
/// conditions of `hour`.
pub fn nominate_worst_point<S: HydraulicSolver + ?Sized>(
    solver: &mut S,
    network: &NetworkHandle,
    inputs: &SimInputs,
    options: &SimOptions,
    hour: usize,
) -> SimResult<usize> {
    let carry = HourCarry::initial(network, inputs, options, hour);
    let boundary = BoundaryConditions {
        consumer_qext_w: inputs.qext_w(hour),
        consumer_mdot_kg_s: carry.mass_flow,
        supply_temperature_k: supply_temperature_k(network, inputs, hour),
        pump_lift_bar: carry.pump.lift_bar,
        pump_flow_bar: carry.pump.flow_bar,
    };
    let state = solver.apply(network, &boundary)?;
    let worst = state.worst_point().ok_or(SimError::InvalidArg {
        what: "network has no consumers",
    })?;
    debug!(
        worst_point = %network.consumers()[worst].consumer.name,
        dp_bar = state.consumers[worst].dp_bar(),
        "worst point nominated"
    );
    Ok(worst)
}

/// Run one hour to convergence (or the cap) and update `carry` on commit.
pub fn simulate_hour<S: HydraulicSolver + ?Sized>(
    solver: &mut S,
    network: &NetworkHandle,
    inputs: &SimInputs,
    options: &SimOptions,
    worst_point: usize,
    hour: usize,
    carry: &mut HourCarry,
) -> SimResult<HourRecord> {
    // Init
    let settings = options.return_temperature;
    let qext = inputs.qext_w(hour);
    let supply_k = supply_temperature_k(network, inputs, hour);
    let mut controllers: Vec<ReturnTemperatureController> = network
        .consumers()
        .iter()
        .enumerate()
        .map(|(i, site)| {
            ReturnTemperatureController::for_hour(
                settings,
                site.consumer.bounds(&settings.envelope),
                qext[i],
                inputs
                    .target_return_c(i, hour)
                    .unwrap_or(settings.target_return_c),
                carry.mass_flow[i],
                carry.bias[i],
            )
            .with_min_supply_c(inputs.min_supply_c(i, hour))
        })
        .collect();
    let mut pressure = PressureController::new(options.pressure);
    let mut setpoint = carry.pump;
    let worst_qext = qext[worst_point];

    let mut iterations = 0;
    loop {
        let boundary = BoundaryConditions {
            consumer_qext_w: qext.clone(),
            consumer_mdot_kg_s: controllers.iter().map(|c| c.mass_flow()).collect(),
            supply_temperature_k: supply_k,
            pump_lift_bar: setpoint.lift_bar,
            pump_flow_bar: setpoint.flow_bar,
        };
        let state = solver.apply(network, &boundary)?;

        let observations: Vec<TemperatureObservation> = state
            .consumers
            .iter()
            .map(|c| TemperatureObservation {
                inlet_c: kelvin_to_celsius(c.t_from_k),
                outlet_c: kelvin_to_celsius(c.t_to_k),
            })
            .collect();
        let mut statuses: Vec<ConvergenceStatus> = controllers
            .par_iter_mut()
            .zip(&observations)
            .map(|(ctrl, &obs)| ctrl.observe(obs))
            .collect();
        let worst_dp = state.consumers[worst_point].dp_bar();
        let mut pump_status = pressure.status(worst_qext, worst_dp);

        let settled = pump_status.is_settled() && statuses.iter().all(|s| s.is_settled());
        if settled || iterations >= options.max_iterations {
            // Commit
            if !settled {
                if !pump_status.is_settled() {
                    pump_status = ConvergenceStatus::IterationCap;
                }
                for status in statuses.iter_mut().filter(|s| !s.is_settled()) {
                    *status = ConvergenceStatus::IterationCap;
                }
                warn!(hour, iterations, "hour did not converge, committing best effort");
            }
            let limited = statuses
                .iter()
                .filter(|s| matches!(s, ConvergenceStatus::LimitReached(_)))
                .count();
            if limited > 0 {
                debug!(hour, consumers = limited, "consumers held at a mass-flow limit");
            }

            let consumers = state
                .consumers
                .iter()
                .zip(&controllers)
                .zip(&statuses)
                .zip(&observations)
                .map(|(((element, ctrl), &status), obs)| ConsumerRecord {
                    qext_w: ctrl.qext_w(),
                    mdot_kg_s: element.mdot_kg_s,
                    t_from_k: element.t_from_k,
                    t_to_k: element.t_to_k,
                    p_from_bar: element.p_from_bar,
                    p_to_bar: element.p_to_bar,
                    target_return_c: ctrl.target_c(),
                    supply_met: ctrl.supply_met(obs.inlet_c),
                    status,
                })
                .collect();

            carry.mass_flow = controllers.iter().map(|c| c.mass_flow()).collect();
            carry.bias = controllers.iter().map(|c| c.bias()).collect();
            carry.pump = setpoint;

            return Ok(HourRecord {
                hour,
                iterations,
                converged: settled
                    && !pump_status.is_flagged()
                    && statuses.iter().all(|s| !s.is_flagged()),
                pump: PumpRecord::from_element(&state.pump, pump_status),
                consumers,
                pipes: state.pipes,
            });
        }

        // Setpoint arithmetic runs in parallel, the network update is one batch
        if !pump_status.is_settled() {
            setpoint = pressure.propose(worst_qext, worst_dp, setpoint);
        }
        controllers
            .par_iter_mut()
            .zip(&observations)
            .zip(&statuses)
            .filter(|(_, status)| !status.is_settled())
            .for_each(|((ctrl, &obs), _)| {
                ctrl.propose(obs);
            });
        iterations += 1;
    }
}
