//! Committed per-hour results.

use hn_controls::ConvergenceStatus;
use hn_core::units::constants::CP_WATER_J_PER_KG_K;
use hn_solver::{PipeElement, PumpElement};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumerRecord {
    pub qext_w: f64,
    pub mdot_kg_s: f64,
    pub t_from_k: f64,
    pub t_to_k: f64,
    pub p_from_bar: f64,
    pub p_to_bar: f64,
    /// Return-temperature target in force when the hour was committed.
    pub target_return_c: f64,
    pub supply_met: bool,
    pub status: ConvergenceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpRecord {
    pub mdot_kg_s: f64,
    pub lift_bar: f64,
    pub p_flow_bar: f64,
    pub p_return_bar: f64,
    pub t_flow_k: f64,
    pub t_return_k: f64,
    pub heat_w: f64,
    pub status: ConvergenceStatus,
}

impl PumpRecord {
    pub fn from_element(pump: &PumpElement, status: ConvergenceStatus) -> Self {
        Self {
            mdot_kg_s: pump.mdot_kg_s,
            lift_bar: pump.lift_bar(),
            p_flow_bar: pump.p_flow_bar,
            p_return_bar: pump.p_return_bar,
            t_flow_k: pump.t_flow_k,
            t_return_k: pump.t_return_k,
            heat_w: pump.mdot_kg_s * CP_WATER_J_PER_KG_K * (pump.t_flow_k - pump.t_return_k),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    pub hour: usize,
    /// Controller iterations (solver calls minus one).
    pub iterations: usize,
    /// Every controller settled within tolerance (or bypassed).
    pub converged: bool,
    pub pump: PumpRecord,
    pub consumers: Vec<ConsumerRecord>,
    pub pipes: Vec<PipeElement>,
}

impl HourRecord {
    pub fn flagged_consumers(&self) -> usize {
        self.consumers
            .iter()
            .filter(|c| c.status.is_flagged())
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    pub worst_point: usize,
    pub hours: Vec<HourRecord>,
}

impl SimRecord {
    pub fn unconverged_hours(&self) -> Vec<usize> {
        self.hours
            .iter()
            .filter(|h| !h.converged)
            .map(|h| h.hour)
            .collect()
    }

    pub fn total_heat_wh(&self) -> f64 {
        self.hours.iter().map(|h| h.pump.heat_w).sum()
    }
}
