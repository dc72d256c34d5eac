//! Per-element results of one solver evaluation.

use serde::{Deserialize, Serialize};

/// Consumer inlet (supply side) and outlet (return side) state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumerElement {
    pub p_from_bar: f64,
    pub p_to_bar: f64,
    pub t_from_k: f64,
    pub t_to_k: f64,
    pub mdot_kg_s: f64,
}

impl ConsumerElement {
    /// Pressure differential across the substation.
    pub fn dp_bar(&self) -> f64 {
        self.p_from_bar - self.p_to_bar
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeElement {
    pub mdot_kg_s: f64,
    pub dp_bar: f64,
    pub t_k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpElement {
    pub mdot_kg_s: f64,
    pub p_flow_bar: f64,
    pub p_return_bar: f64,
    pub t_flow_k: f64,
    pub t_return_k: f64,
}

impl PumpElement {
    pub fn lift_bar(&self) -> f64 {
        self.p_flow_bar - self.p_return_bar
    }
}

/// Everything a solver reports back for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub consumers: Vec<ConsumerElement>,
    pub pipes: Vec<PipeElement>,
    pub pump: PumpElement,
}

impl ElementState {
    /// Consumer with the smallest pressure differential (first on ties).
    pub fn worst_point(&self) -> Option<usize> {
        self.consumers
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.dp_bar().total_cmp(&b.dp_bar()))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumer(dp: f64) -> ConsumerElement {
        ConsumerElement {
            p_from_bar: 3.0,
            p_to_bar: 3.0 - dp,
            t_from_k: 350.0,
            t_to_k: 330.0,
            mdot_kg_s: 0.1,
        }
    }

    #[test]
    fn worst_point_is_smallest_differential() {
        let state = ElementState {
            consumers: vec![consumer(1.2), consumer(0.4), consumer(0.4), consumer(0.9)],
            pipes: vec![],
            pump: PumpElement {
                mdot_kg_s: 0.4,
                p_flow_bar: 4.0,
                p_return_bar: 2.5,
                t_flow_k: 358.15,
                t_return_k: 330.0,
            },
        };
        assert_eq!(state.worst_point(), Some(1));
        assert!((state.pump.lift_bar() - 1.5).abs() < 1e-12);
    }
}
