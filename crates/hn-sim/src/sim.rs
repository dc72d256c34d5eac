//! Simulation runner.

use std::ops::Range;

use hn_controls::{PressureControlSettings, ReturnTemperatureSettings};
use hn_solver::{HydraulicSolver, NetworkHandle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SimError, SimResult};
use crate::orchestrator::{HourCarry, nominate_worst_point, simulate_hour};
use crate::record::{HourRecord, SimRecord};
use crate::schedule::SimInputs;

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// First and one-past-last hour; `None` runs every scheduled hour.
    pub hours: Option<Range<usize>>,
    /// Iterations per hour before committing best effort.
    pub max_iterations: usize,
    /// Pressure-control reference consumer; nominated by the solver if unset.
    pub worst_point: Option<usize>,
    pub pressure: PressureControlSettings,
    pub return_temperature: ReturnTemperatureSettings,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            hours: None,
            max_iterations: 100,
            worst_point: None,
            pressure: PressureControlSettings::default(),
            return_temperature: ReturnTemperatureSettings::default(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if self.max_iterations == 0 {
            return Err(SimError::InvalidArg {
                what: "max_iterations must be positive",
            });
        }
        self.pressure.validate()?;
        self.return_temperature.validate()?;
        Ok(())
    }

    fn hour_range(&self, inputs: &SimInputs) -> SimResult<Range<usize>> {
        let all = 0..inputs.hours();
        match &self.hours {
            None => Ok(all),
            Some(r) if r.start <= r.end && r.end <= all.end => Ok(r.clone()),
            Some(_) => Err(SimError::InvalidArg {
                what: "hour range exceeds the schedules",
            }),
        }
    }
}

/// Progress after each committed hour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    pub hour: usize,
    pub completed: usize,
    pub total: usize,
    pub converged: bool,
}

struct Prepared {
    hours: Range<usize>,
    worst_point: usize,
}

fn prepare<S: HydraulicSolver + ?Sized>(
    solver: &mut S,
    network: &NetworkHandle,
    inputs: &SimInputs,
    options: &SimOptions,
) -> SimResult<Prepared> {
    options.validate()?;
    inputs.validate(network.consumer_count())?;
    if network.consumer_count() == 0 {
        return Err(SimError::InvalidArg {
            what: "network has no consumers",
        });
    }
    let hours = options.hour_range(inputs)?;

    let worst_point = match options.worst_point {
        Some(i) if i < network.consumer_count() => i,
        Some(_) => {
            return Err(SimError::InvalidArg {
                what: "worst point index out of range",
            });
        }
        None => nominate_worst_point(solver, network, inputs, options, hours.start)?,
    };
    Ok(Prepared { hours, worst_point })
}

/// Run the hourly simulation sequentially.
pub fn run_sim<S: HydraulicSolver + ?Sized>(
    solver: &mut S,
    network: &NetworkHandle,
    inputs: &SimInputs,
    options: &SimOptions,
) -> SimResult<SimRecord> {
    run_sim_with_progress(solver, network, inputs, options, |_| {})
}

/// Sequential run reporting progress after every committed hour.
pub fn run_sim_with_progress<S, F>(
    solver: &mut S,
    network: &NetworkHandle,
    inputs: &SimInputs,
    options: &SimOptions,
    mut progress: F,
) -> SimResult<SimRecord>
where
    S: HydraulicSolver + ?Sized,
    F: FnMut(SimProgress),
{
    let Prepared { hours, worst_point } = prepare(solver, network, inputs, options)?;
    let total = hours.len();
    info!(
        hours = total,
        consumers = network.consumer_count(),
        solver = solver.name(),
        "simulation started"
    );

    let mut carry = HourCarry::initial(network, inputs, options, hours.start);
    let mut records = Vec::with_capacity(total);
    for (completed, hour) in hours.enumerate() {
        let record = simulate_hour(
            solver,
            network,
            inputs,
            options,
            worst_point,
            hour,
            &mut carry,
        )?;
        progress(SimProgress {
            hour,
            completed: completed + 1,
            total,
            converged: record.converged,
        });
        records.push(record);
    }

    let record = SimRecord {
        worst_point,
        hours: records,
    };
    info!(
        unconverged = record.unconverged_hours().len(),
        "simulation finished"
    );
    Ok(record)
}

/// Run contiguous chunks of hours on worker threads.
///
/// Each chunk gets its own solver from `make_solver` and starts from fresh
/// initial conditions; within a chunk hours carry state as in [`run_sim`].
pub fn run_sim_parallel<S, F>(
    make_solver: F,
    network: &NetworkHandle,
    inputs: &SimInputs,
    options: &SimOptions,
    chunk_hours: usize,
) -> SimResult<SimRecord>
where
    S: HydraulicSolver,
    F: Fn() -> S + Sync,
{
    if chunk_hours == 0 {
        return Err(SimError::InvalidArg {
            what: "chunk_hours must be positive",
        });
    }
    let Prepared { hours, worst_point } = prepare(&mut make_solver(), network, inputs, options)?;

    let starts: Vec<usize> = hours.clone().step_by(chunk_hours).collect();
    info!(
        hours = hours.len(),
        chunks = starts.len(),
        "parallel simulation started"
    );

    let chunks: Vec<Vec<HourRecord>> = starts
        .par_iter()
        .map(|&start| {
            let end = (start + chunk_hours).min(hours.end);
            let mut solver = make_solver();
            let mut carry = HourCarry::initial(network, inputs, options, start);
            (start..end)
                .map(|hour| {
                    simulate_hour(
                        &mut solver,
                        network,
                        inputs,
                        options,
                        worst_point,
                        hour,
                        &mut carry,
                    )
                })
                .collect::<SimResult<Vec<_>>>()
        })
        .collect::<SimResult<_>>()?;

    Ok(SimRecord {
        worst_point,
        hours: chunks.into_iter().flatten().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.max_iterations, 100);
        assert!(opts.hours.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        let opts = SimOptions {
            max_iterations: 0,
            ..SimOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn hour_range_checked_against_schedule() {
        let inputs = SimInputs {
            consumers: vec![crate::ConsumerSchedule::demand(vec![0.0; 24])],
            supply_temperature_c: None,
        };
        let opts = SimOptions {
            hours: Some(6..30),
            ..SimOptions::default()
        };
        assert!(opts.hour_range(&inputs).is_err());
        let opts = SimOptions {
            hours: Some(6..12),
            ..SimOptions::default()
        };
        assert_eq!(opts.hour_range(&inputs).unwrap(), 6..12);
    }
}
