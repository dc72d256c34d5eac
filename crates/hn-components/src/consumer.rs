//! Heat consumer: flow control valve plus heat exchanger at a building.

use std::f64::consts::PI;

use hn_core::units::constants::{CP_WATER_J_PER_KG_K, RHO_WATER_KG_M3};
use hn_core::units::{Length, mm};
use serde::{Deserialize, Serialize};

use crate::common::check_positive;
use crate::envelope::{MassFlowBounds, VelocityEnvelope};
use crate::error::ComponentResult;

/// A consumer as seen by the hydraulic network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatConsumer {
    pub name: String,
    /// Inner diameter of the consumer's flow-control section.
    pub diameter_mm: f64,
}

impl HeatConsumer {
    pub fn new(name: impl Into<String>, diameter_mm: f64) -> ComponentResult<Self> {
        check_positive(diameter_mm, "consumer diameter")?;
        Ok(Self {
            name: name.into(),
            diameter_mm,
        })
    }

    /// Size the consumer so its peak design flow runs at `v_max_mps`.
    ///
    /// Design flow is `q / (cp · ΔT)`; the diameter is rounded to whole mm.
    pub fn sized_for(
        name: impl Into<String>,
        peak_demand_w: f64,
        design_delta_t_k: f64,
        v_max_mps: f64,
    ) -> ComponentResult<Self> {
        check_positive(peak_demand_w, "peak demand")?;
        check_positive(design_delta_t_k, "design temperature difference")?;
        check_positive(v_max_mps, "design velocity")?;

        let mdot = peak_demand_w / (CP_WATER_J_PER_KG_K * design_delta_t_k);
        let area = mdot / RHO_WATER_KG_M3 / v_max_mps;
        let diameter_mm = ((area * 4.0 / PI).sqrt() * 1000.0).round().max(1.0);
        Self::new(name, diameter_mm)
    }

    pub fn diameter(&self) -> Length {
        mm(self.diameter_mm)
    }

    pub fn bounds(&self, envelope: &VelocityEnvelope) -> MassFlowBounds {
        envelope.bounds(self.diameter())
    }
}
