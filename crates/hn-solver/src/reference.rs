//! Deterministic reference solver for radial networks.
//!
//! Supply and return are mirror images: every pipe carries the summed flow of
//! the consumers behind it, loses `f·L/D·½ρv²` on the way out and the same on
//! the way back. Supply water cools linearly with path length; each consumer
//! extracts `q = ṁ·cp·(T_in − T_out)`.

use hn_components::common::EPSILON_MDOT;
use hn_components::pressure_drop_pa;
use hn_core::units::constants::CP_WATER_J_PER_KG_K;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::HydraulicSolver;
use crate::boundary::BoundaryConditions;
use crate::error::{SolverError, SolverResult};
use crate::network::NetworkHandle;
use crate::state::{ConsumerElement, ElementState, PipeElement, PumpElement};

const PA_PER_BAR: f64 = 1e5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSolver {
    /// Supply temperature drop per metre of pipe (K/m).
    pub heat_loss_k_per_m: f64,
    /// No water leaves a consumer colder than this (K).
    pub ground_temperature_k: f64,
}

impl Default for ReferenceSolver {
    fn default() -> Self {
        Self {
            heat_loss_k_per_m: 0.001,
            ground_temperature_k: 283.15,
        }
    }
}

impl ReferenceSolver {
    pub const NAME: &'static str = "reference-quadratic-v1";
}

impl HydraulicSolver for ReferenceSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(
        &mut self,
        network: &NetworkHandle,
        boundary: &BoundaryConditions,
    ) -> SolverResult<ElementState> {
        boundary.validate(network)?;
        let topology = network.topology();
        let sites = network.consumers();

        // Accumulate branch flows and the distance to each pipe's far end
        let mut pipe_flow = vec![0.0; topology.pipes().len()];
        let mut pipe_reach = vec![0.0; topology.pipes().len()];
        for (site, &mdot) in sites.iter().zip(&boundary.consumer_mdot_kg_s) {
            let mut reach = 0.0;
            for &pipe_id in &site.path {
                let pipe = topology.pipe(pipe_id).ok_or_else(|| SolverError::InvalidState {
                    what: format!("consumer path references missing pipe {}", pipe_id.index()),
                })?;
                reach += pipe.length_m;
                pipe_flow[pipe_id.idx()] += mdot;
                pipe_reach[pipe_id.idx()] = reach;
            }
        }

        let mut pipe_dp_bar = Vec::with_capacity(pipe_flow.len());
        for (pipe, &mdot) in topology.pipes().iter().zip(&pipe_flow) {
            let pipe_type = network
                .pipe_type(pipe.id)
                .ok_or_else(|| SolverError::ProblemSetup {
                    what: format!("no pipe type for pipe {}", pipe.id.index()),
                })?;
            pipe_dp_bar.push(pressure_drop_pa(pipe_type, pipe.length_m, mdot)? / PA_PER_BAR);
        }

        let t_supply = boundary.supply_temperature_k;
        let floor = self.ground_temperature_k;
        let p_flow = boundary.pump_flow_bar;
        let p_return = boundary.pump_flow_bar - boundary.pump_lift_bar;

        let mut consumers = Vec::with_capacity(sites.len());
        for (i, site) in sites.iter().enumerate() {
            let mdot = boundary.consumer_mdot_kg_s[i];
            let qext = boundary.consumer_qext_w[i];
            let drop: f64 = site.path.iter().map(|p| pipe_dp_bar[p.idx()]).sum();

            let t_from = (t_supply - self.heat_loss_k_per_m * site.path_length_m).max(floor);
            let t_to = if qext > 0.0 {
                (t_from - qext / (mdot.max(EPSILON_MDOT) * CP_WATER_J_PER_KG_K)).max(floor)
            } else {
                t_from
            };

            consumers.push(ConsumerElement {
                p_from_bar: p_flow - drop,
                p_to_bar: p_return + drop,
                t_from_k: t_from,
                t_to_k: t_to,
                mdot_kg_s: mdot,
            });
        }

        let pipes = pipe_flow
            .iter()
            .zip(&pipe_dp_bar)
            .zip(&pipe_reach)
            .map(|((&mdot, &dp), &reach)| PipeElement {
                mdot_kg_s: mdot,
                dp_bar: dp,
                t_k: (t_supply - self.heat_loss_k_per_m * reach).max(floor),
            })
            .collect();

        let total: f64 = consumers.iter().map(|c| c.mdot_kg_s).sum();
        let t_return = if total > EPSILON_MDOT {
            consumers.iter().map(|c| c.mdot_kg_s * c.t_to_k).sum::<f64>() / total
        } else {
            t_supply
        };

        debug!(
            consumers = consumers.len(),
            mdot_kg_s = total,
            t_return_k = t_return,
            "reference solver evaluated"
        );

        Ok(ElementState {
            consumers,
            pipes,
            pump: PumpElement {
                mdot_kg_s: total,
                p_flow_bar: p_flow,
                p_return_bar: p_return,
                t_flow_k: t_supply,
                t_return_k: t_return,
            },
        })
    }
}
