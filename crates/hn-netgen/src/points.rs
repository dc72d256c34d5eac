//! Connection points: where buildings and producers attach to the network.

use hn_graph::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointRole {
    Consumer,
    Producer,
}

/// A building or producer location. Immutable once imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPoint {
    pub id: String,
    pub position: Point,
    pub role: PointRole,
    /// Peak heat demand in W, used to attribute demand to pipes (0 for producers).
    #[serde(default)]
    pub peak_demand_w: f64,
}

impl ConnectionPoint {
    pub fn consumer(id: impl Into<String>, position: Point, peak_demand_w: f64) -> Self {
        Self {
            id: id.into(),
            position,
            role: PointRole::Consumer,
            peak_demand_w,
        }
    }

    pub fn producer(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            role: PointRole::Producer,
            peak_demand_w: 0.0,
        }
    }

    pub fn is_producer(&self) -> bool {
        self.role == PointRole::Producer
    }
}
