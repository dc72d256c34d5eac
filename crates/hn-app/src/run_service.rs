//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use hn_project::Project;
use hn_results::{RunManifest, RunStore, RunType, compute_run_id, now_timestamp};
use hn_sim::{SimRecord, run_sim_parallel, run_sim_with_progress};
use hn_solver::{HydraulicSolver, ReferenceSolver};
use tracing::info;

use crate::error::AppResult;
use crate::network_service;
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service::{self, project_hours};

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver: ReferenceSolver,
    /// Overrides the project's `simulation.chunk_hours`.
    pub chunk_hours: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver: ReferenceSolver::default(),
            chunk_hours: None,
        }
    }
}

impl RunOptions {
    /// Solver name plus its parameters; part of the run id.
    pub fn solver_version(&self) -> String {
        let params = serde_json::to_string(&self.solver).unwrap_or_default();
        format!("{} {}", self.solver.name(), params)
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub generate_time_s: f64,
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            Some(message.to_string()),
        ));
    }
}

/// Run type recorded for `project` under `options`.
pub fn run_type(project: &Project, options: &RunOptions) -> RunType {
    let sim = &project.simulation;
    let range = sim.hours.clone().unwrap_or(0..project_hours(project));
    match options.chunk_hours.or(sim.chunk_hours) {
        Some(chunk_hours) => RunType::ChunkParallel {
            first_hour: range.start,
            hours: range.len(),
            max_iterations: sim.max_iterations,
            chunk_hours,
        },
        None => RunType::Hourly {
            first_hour: range.start,
            hours: range.len(),
            max_iterations: sim.max_iterations,
        },
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(&mut progress_cb, RunStage::LoadingProject, started, "Loading project");
    let project = project_service::load_project(request.project_path)?;

    emit_progress(&mut progress_cb, RunStage::CheckingCache, started, "Checking run cache");
    let run_type = run_type(&project, &request.options);
    let solver_version = request.options.solver_version();
    let run_id = compute_run_id(&project, &run_type, &solver_version);
    let store = RunStore::for_project(request.project_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            "Loading cached run",
        );
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();

        emit_progress(&mut progress_cb, RunStage::Completed, started, "Loaded cached run");
        info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::GeneratingNetwork,
        started,
        "Generating network",
    );
    let generate_started = Instant::now();
    let setup = network_service::prepare_simulation(&project)?;
    timing.generate_time_s = generate_started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::Simulating, started, "Simulating hours");
    let simulate_started = Instant::now();
    let record = simulate(&setup, &run_type, &request.options, &mut progress_cb, started)?;
    timing.simulate_time_s = simulate_started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::SavingResults, started, "Saving results");
    let save_started = Instant::now();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        project_name: project.name.clone(),
        timestamp: now_timestamp(),
        run_type,
        solver_version,
        worst_point: record.worst_point,
        consumer_ids: setup.consumer_ids.clone(),
        unconverged_hours: record.unconverged_hours(),
    };
    store.save_run(&manifest, &record.hours)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::Completed, started, "Run completed");
    info!(
        run_id = %run_id,
        hours = record.hours.len(),
        unconverged = manifest.unconverged_hours.len(),
        total_s = timing.total_time_s,
        "run completed"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

fn simulate(
    setup: &network_service::SimSetup,
    run_type: &RunType,
    options: &RunOptions,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<SimRecord> {
    let record = match *run_type {
        RunType::ChunkParallel { chunk_hours, .. } => run_sim_parallel(
            || options.solver,
            &setup.handle,
            &setup.inputs,
            &setup.options,
            chunk_hours,
        )?,
        RunType::Hourly { .. } => {
            let mut solver = options.solver;
            run_sim_with_progress(
                &mut solver,
                &setup.handle,
                &setup.inputs,
                &setup.options,
                |hourly| {
                    if let Some(cb) = progress_cb.as_deref_mut() {
                        cb(RunProgressEvent {
                            stage: RunStage::Simulating,
                            elapsed_wall_s: started.elapsed().as_secs_f64(),
                            message: None,
                            hourly: Some(hourly),
                        });
                    }
                },
            )?
        }
    };
    Ok(record)
}

/// Runs of the project at `project_path`, most recent first.
pub fn list_runs(project_path: &Path) -> AppResult<Vec<RunManifest>> {
    let project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;

    let mut runs = store.list_runs(&project.name)?;
    runs.reverse();
    Ok(runs)
}

pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<(RunManifest, SimRecord)> {
    let store = RunStore::for_project(project_path)?;
    Ok(store.load_record(run_id)?)
}
