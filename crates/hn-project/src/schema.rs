//! Project schema definitions.

use std::ops::Range;

use hn_controls::{PressureControlSettings, ReturnTemperatureSettings};
use hn_netgen::GenerationOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub streets: Vec<StreetDef>,
    #[serde(default)]
    pub points: Vec<PointDef>,
    #[serde(default)]
    pub demand_series: Vec<DemandSeriesDef>,
    #[serde(default)]
    pub network: GenerationOptions,
    #[serde(default)]
    pub pipes: PipesDef,
    #[serde(default)]
    pub plant: PlantDef,
    #[serde(default)]
    pub simulation: SimulationDef,
    #[serde(default)]
    pub controls: ControlsDef,
}

impl Project {
    pub fn consumers(&self) -> impl Iterator<Item = &PointDef> {
        self.points.iter().filter(|p| p.role == PointRoleDef::Consumer)
    }

    pub fn producers(&self) -> impl Iterator<Item = &PointDef> {
        self.points.iter().filter(|p| p.role == PointRoleDef::Producer)
    }

    pub fn series(&self, id: &str) -> Option<&DemandSeriesDef> {
        self.demand_series.iter().find(|s| s.id == id)
    }
}

/// Street centreline in a projected CRS (metres).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreetDef {
    pub id: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointRoleDef {
    #[default]
    Consumer,
    Producer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub role: PointRoleDef,
    /// Demand series id (consumers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<String>,
    /// Substation diameter; sized from peak demand when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_mm: Option<f64>,
}

/// Hourly heat demand of one building, with optional temperature targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandSeriesDef {
    pub id: String,
    pub hourly_w: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_return_c: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_supply_c: Option<Vec<f64>>,
}

impl DemandSeriesDef {
    pub fn peak_w(&self) -> f64 {
        self.hourly_w.iter().copied().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeTypeDef {
    pub name: String,
    pub inner_diameter_mm: f64,
    #[serde(default = "default_roughness_mm")]
    pub roughness_mm: f64,
}

fn default_roughness_mm() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipesDef {
    /// Catalog type used for every network pipe.
    pub pipe_type: String,
    pub overrides: Vec<PipeTypeDef>,
}

impl Default for PipesDef {
    fn default() -> Self {
        Self {
            pipe_type: "KMR 100/250-2v".to_string(),
            overrides: vec![],
        }
    }
}

/// Heat plant: circulation pump setpoints and the design point used to
/// size substations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlantDef {
    pub lift_bar: f64,
    pub flow_bar: f64,
    pub supply_temperature_c: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_schedule_c: Option<Vec<f64>>,
    pub design_return_c: f64,
    pub design_velocity_mps: f64,
}

impl Default for PlantDef {
    fn default() -> Self {
        Self {
            lift_bar: 1.5,
            flow_bar: 4.0,
            supply_temperature_c: 85.0,
            supply_schedule_c: None,
            design_return_c: 60.0,
            design_velocity_mps: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Range<usize>>,
    pub max_iterations: usize,
    /// Consumer id for pressure control; nominated automatically when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_point: Option<String>,
    /// Run contiguous chunks of this many hours in parallel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_hours: Option<usize>,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            hours: None,
            max_iterations: 100,
            worst_point: None,
            chunk_hours: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsDef {
    pub pressure: PressureControlSettings,
    pub return_temperature: ReturnTemperatureSettings,
}
