//! From project to generated layers and a simulation-ready network.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hn_components::{CirculationPump, HeatConsumer, PipeCatalog, PipeType};
use hn_core::units::{bar, celsius_to_kelvin, k};
use hn_graph::{Point, StreetLayer};
use hn_netgen::{ConnectionPoint, GeneratedNetwork};
use hn_project::{PointRoleDef, Project};
use hn_sim::{ConsumerSchedule, SimInputs, SimOptions};
use hn_solver::NetworkHandle;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::project_service::project_hours;

/// Everything a simulation run needs, built from one project.
#[derive(Debug, Clone)]
pub struct SimSetup {
    pub network: GeneratedNetwork,
    pub handle: NetworkHandle,
    pub inputs: SimInputs,
    pub options: SimOptions,
    /// Ids of the simulated consumers, in network order.
    pub consumer_ids: Vec<String>,
}

/// Outcome of a `generate` command.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub forward_pipes: usize,
    pub return_pipes: usize,
    pub forward_length_m: f64,
    pub return_length_m: f64,
    /// Point ids that could not be attached to a street.
    pub unconnectable: Vec<String>,
    pub warnings: Vec<String>,
    pub files: Vec<PathBuf>,
}

fn point(xy: [f64; 2]) -> Point {
    Point::new(xy[0], xy[1])
}

pub fn street_layer(project: &Project) -> AppResult<StreetLayer> {
    let lines = project
        .streets
        .iter()
        .map(|s| s.points.iter().copied().map(point).collect())
        .collect();
    Ok(StreetLayer::new(lines)?)
}

/// Connection points in project order; consumers carry their peak demand.
pub fn connection_points(project: &Project) -> Vec<ConnectionPoint> {
    project
        .points
        .iter()
        .map(|p| {
            let at = Point::new(p.x, p.y);
            match p.role {
                PointRoleDef::Producer => ConnectionPoint::producer(p.id.clone(), at),
                PointRoleDef::Consumer => {
                    let peak = p
                        .demand
                        .as_deref()
                        .and_then(|id| project.series(id))
                        .map_or(0.0, |s| s.peak_w());
                    ConnectionPoint::consumer(p.id.clone(), at, peak)
                }
            }
        })
        .collect()
}

pub fn generate_network(project: &Project) -> AppResult<GeneratedNetwork> {
    let streets = street_layer(project)?;
    let points = connection_points(project);
    let network = hn_netgen::generate_network(&points, &streets, &project.network)?;

    for index in network.unconnectable() {
        warn!(point = %project.points[index].id, "point could not be attached to a street");
    }
    Ok(network)
}

/// Generate the network and write its four GeoJSON layers into `out_dir`.
pub fn export_layers(project: &Project, out_dir: &Path) -> AppResult<(GeneratedNetwork, GenerateReport)> {
    let network = generate_network(project)?;
    let files = hn_results::write_layers(out_dir, &network)?;

    let warnings = network
        .forward
        .reconcile
        .warnings
        .iter()
        .chain(&network.return_side.reconcile.warnings)
        .cloned()
        .collect();
    let report = GenerateReport {
        forward_pipes: network.forward.topology.pipes().len(),
        return_pipes: network.return_side.topology.pipes().len(),
        forward_length_m: network.forward.topology.total_length(),
        return_length_m: network.return_side.topology.total_length(),
        unconnectable: network
            .unconnectable()
            .into_iter()
            .map(|i| project.points[i].id.clone())
            .collect(),
        warnings,
        files,
    };
    Ok((network, report))
}

/// Standard catalog with the project's overrides applied.
pub fn pipe_catalog(project: &Project) -> AppResult<PipeCatalog> {
    let overrides = project
        .pipes
        .overrides
        .iter()
        .map(|o| PipeType::new(o.name.clone(), o.inner_diameter_mm, o.roughness_mm))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PipeCatalog::standard().with_overrides(overrides))
}

/// Place the pump and the attachable consumers on the forward network.
///
/// Consumers that could not be attached are left out and logged; the
/// returned ids give the network's consumer order.
pub fn build_network_handle(
    project: &Project,
    network: &GeneratedNetwork,
) -> AppResult<(NetworkHandle, Vec<String>)> {
    let plant = &project.plant;
    let topology = &network.forward.topology;
    let unconnectable: HashSet<usize> = network.unconnectable().into_iter().collect();

    let producer = project
        .producers()
        .next()
        .ok_or_else(|| AppError::InvalidInput("project has no producer".to_string()))?;
    let pump = CirculationPump::new(
        producer.id.clone(),
        bar(plant.lift_bar),
        bar(plant.flow_bar),
        k(celsius_to_kelvin(plant.supply_temperature_c)),
    )?;

    let design_delta_t = plant.supply_temperature_c - plant.design_return_c;
    let mut consumers = Vec::new();
    for (index, p) in project.points.iter().enumerate() {
        if p.role != PointRoleDef::Consumer {
            continue;
        }
        let at = Point::new(p.x, p.y);
        if unconnectable.contains(&index) || topology.find_node(at).is_none() {
            warn!(consumer = %p.id, "consumer left out of the simulation");
            continue;
        }
        let consumer = match p.diameter_mm {
            Some(d) => HeatConsumer::new(p.id.clone(), d)?,
            None => {
                let peak = p
                    .demand
                    .as_deref()
                    .and_then(|id| project.series(id))
                    .map_or(0.0, |s| s.peak_w());
                // Idle consumers get the smallest size.
                HeatConsumer::sized_for(
                    p.id.clone(),
                    peak.max(1.0),
                    design_delta_t,
                    plant.design_velocity_mps,
                )?
            }
        };
        consumers.push((consumer, at));
    }

    let ids = consumers.iter().map(|(c, _)| c.name.clone()).collect();
    let pipe_type = pipe_catalog(project)?.get(&project.pipes.pipe_type)?.clone();
    let handle = NetworkHandle::new(
        topology.clone(),
        Point::new(producer.x, producer.y),
        pump,
        consumers,
        &pipe_type,
    )?;
    info!(
        consumers = handle.consumer_count(),
        pipe_type = %pipe_type.name,
        "network ready for simulation"
    );
    Ok((handle, ids))
}

/// Hourly schedules for `consumer_ids`, in that order.
pub fn sim_inputs(project: &Project, consumer_ids: &[String]) -> SimInputs {
    let hours = project_hours(project);
    let consumers = consumer_ids
        .iter()
        .map(|id| {
            let series = project
                .points
                .iter()
                .find(|p| &p.id == id)
                .and_then(|p| p.demand.as_deref())
                .and_then(|d| project.series(d));
            match series {
                Some(s) => ConsumerSchedule {
                    qext_w: s.hourly_w.clone(),
                    target_return_c: s.target_return_c.clone(),
                    min_supply_c: s.min_supply_c.clone(),
                },
                None => ConsumerSchedule::demand(vec![0.0; hours]),
            }
        })
        .collect();

    SimInputs {
        consumers,
        supply_temperature_c: project.plant.supply_schedule_c.clone(),
    }
}

pub fn sim_options(project: &Project, consumer_ids: &[String]) -> AppResult<SimOptions> {
    let sim = &project.simulation;
    let worst_point = match &sim.worst_point {
        Some(id) => Some(consumer_ids.iter().position(|c| c == id).ok_or_else(|| {
            AppError::InvalidInput(format!("worst point '{id}' is not on the network"))
        })?),
        None => None,
    };

    Ok(SimOptions {
        hours: sim.hours.clone(),
        max_iterations: sim.max_iterations,
        worst_point,
        pressure: project.controls.pressure,
        return_temperature: project.controls.return_temperature,
    })
}

pub fn prepare_simulation(project: &Project) -> AppResult<SimSetup> {
    let network = generate_network(project)?;
    let (handle, consumer_ids) = build_network_handle(project, &network)?;
    let inputs = sim_inputs(project, &consumer_ids);
    let options = sim_options(project, &consumer_ids)?;
    Ok(SimSetup {
        network,
        handle,
        inputs,
        options,
        consumer_ids,
    })
}
