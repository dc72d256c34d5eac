//! Fluent construction of projects in code.

use hn_netgen::GenerationOptions;

use crate::migrate::LATEST_VERSION;
use crate::schema::{
    ControlsDef, DemandSeriesDef, PipesDef, PlantDef, PointDef, PointRoleDef, Project,
    SimulationDef, StreetDef,
};

#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: Project {
                version: LATEST_VERSION,
                name: name.into(),
                streets: vec![],
                points: vec![],
                demand_series: vec![],
                network: GenerationOptions::default(),
                pipes: PipesDef::default(),
                plant: PlantDef::default(),
                simulation: SimulationDef::default(),
                controls: ControlsDef::default(),
            },
        }
    }

    pub fn street(mut self, id: impl Into<String>, points: &[[f64; 2]]) -> Self {
        self.project.streets.push(StreetDef {
            id: id.into(),
            points: points.to_vec(),
        });
        self
    }

    pub fn producer(mut self, id: impl Into<String>, at: [f64; 2]) -> Self {
        self.project.points.push(PointDef {
            id: id.into(),
            name: String::new(),
            x: at[0],
            y: at[1],
            role: PointRoleDef::Producer,
            demand: None,
            diameter_mm: None,
        });
        self
    }

    pub fn consumer(mut self, id: impl Into<String>, at: [f64; 2], demand: Option<&str>) -> Self {
        self.project.points.push(PointDef {
            id: id.into(),
            name: String::new(),
            x: at[0],
            y: at[1],
            role: PointRoleDef::Consumer,
            demand: demand.map(str::to_string),
            diameter_mm: None,
        });
        self
    }

    pub fn demand(mut self, id: impl Into<String>, hourly_w: Vec<f64>) -> Self {
        self.project.demand_series.push(DemandSeriesDef {
            id: id.into(),
            hourly_w,
            target_return_c: None,
            min_supply_c: None,
        });
        self
    }

    pub fn network(mut self, options: GenerationOptions) -> Self {
        self.project.network = options;
        self
    }

    pub fn plant(mut self, plant: PlantDef) -> Self {
        self.project.plant = plant;
        self
    }

    pub fn simulation(mut self, simulation: SimulationDef) -> Self {
        self.project.simulation = simulation;
        self
    }

    pub fn controls(mut self, controls: ControlsDef) -> Self {
        self.project.controls = controls;
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}
