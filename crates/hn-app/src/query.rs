//! Query helpers for extracting data from loaded runs.

use hn_core::kelvin_to_celsius;
use hn_results::{PumpTotals, RunManifest, pump_summary, pump_totals};
use hn_sim::SimRecord;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub hour_range: (usize, usize),
    pub record_count: usize,
    pub consumer_count: usize,
    pub worst_point: Option<String>,
    pub unconverged_hours: Vec<usize>,
    /// Consumer-hours that settled at a limit or the iteration cap.
    pub flagged_consumer_hours: usize,
    pub pump: PumpTotals,
}

pub fn get_run_summary(manifest: &RunManifest, record: &SimRecord) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (record.hours.first(), record.hours.last()) else {
        return Err(AppError::InvalidInput("No records in run".to_string()));
    };

    Ok(RunSummary {
        hour_range: (first.hour, last.hour),
        record_count: record.hours.len(),
        consumer_count: manifest.consumer_ids.len(),
        worst_point: manifest.worst_point_id().map(str::to_string),
        unconverged_hours: record.unconverged_hours(),
        flagged_consumer_hours: record.hours.iter().map(|h| h.flagged_consumers()).sum(),
        pump: pump_totals(&pump_summary(&record.hours)),
    })
}

/// Hourly values of one consumer variable.
///
/// Variables: `qext_w`, `mdot_kg_s`, `t_from_c`, `t_to_c`, `dp_bar`.
pub fn consumer_series(
    manifest: &RunManifest,
    record: &SimRecord,
    consumer_id: &str,
    variable: &str,
) -> AppResult<Vec<(usize, f64)>> {
    let index = manifest
        .consumer_ids
        .iter()
        .position(|id| id == consumer_id)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown consumer: {}", consumer_id)))?;

    let extract: fn(&hn_sim::ConsumerRecord) -> f64 = match variable {
        "qext_w" | "demand" => |c| c.qext_w,
        "mdot_kg_s" | "mass_flow" => |c| c.mdot_kg_s,
        "t_from_c" | "supply" => |c| kelvin_to_celsius(c.t_from_k),
        "t_to_c" | "return" => |c| kelvin_to_celsius(c.t_to_k),
        "dp_bar" | "pressure" => |c| c.p_from_bar - c.p_to_bar,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown consumer variable: {}",
                variable
            )));
        }
    };

    Ok(record
        .hours
        .iter()
        .filter_map(|h| h.consumers.get(index).map(|c| (h.hour, extract(c))))
        .collect())
}
