//! Boundary conditions for one solver evaluation.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use crate::network::NetworkHandle;

/// Values imposed on the network for one iteration.
///
/// Per-consumer vectors are indexed like [`NetworkHandle::consumers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditions {
    pub consumer_qext_w: Vec<f64>,
    pub consumer_mdot_kg_s: Vec<f64>,
    pub supply_temperature_k: f64,
    pub pump_lift_bar: f64,
    pub pump_flow_bar: f64,
}

impl BoundaryConditions {
    /// Pump setpoints and supply temperature from the network's pump, no demand.
    pub fn idle(network: &NetworkHandle) -> Self {
        let n = network.consumer_count();
        let pump = network.pump();
        Self {
            consumer_qext_w: vec![0.0; n],
            consumer_mdot_kg_s: vec![0.0; n],
            supply_temperature_k: hn_core::celsius_to_kelvin(pump.supply_temperature_c),
            pump_lift_bar: pump.lift_bar,
            pump_flow_bar: pump.flow_bar,
        }
    }

    pub fn validate(&self, network: &NetworkHandle) -> SolverResult<()> {
        let n = network.consumer_count();
        if self.consumer_qext_w.len() != n || self.consumer_mdot_kg_s.len() != n {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "boundary length mismatch: {} demands, {} flows for {} consumers",
                    self.consumer_qext_w.len(),
                    self.consumer_mdot_kg_s.len(),
                    n
                ),
            });
        }

        let scalars = [
            self.supply_temperature_k,
            self.pump_lift_bar,
            self.pump_flow_bar,
        ];
        let non_finite = self
            .consumer_qext_w
            .iter()
            .chain(&self.consumer_mdot_kg_s)
            .chain(&scalars)
            .find(|v| !v.is_finite());
        if let Some(v) = non_finite {
            return Err(SolverError::Numeric {
                what: format!("non-finite boundary value {v}"),
            });
        }
        if self.consumer_mdot_kg_s.iter().any(|&m| m < 0.0) {
            return Err(SolverError::InvalidState {
                what: "negative consumer mass flow".to_string(),
            });
        }
        Ok(())
    }
}
