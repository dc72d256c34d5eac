//! Pump and consumer summaries with CSV export.

use std::io::Write;

use hn_core::kelvin_to_celsius;
use hn_sim::HourRecord;
use serde::Serialize;

use crate::ResultsResult;

/// One hour of plant-side operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PumpSummaryRow {
    pub hour: usize,
    pub heat_kw: f64,
    pub mdot_kg_s: f64,
    pub lift_bar: f64,
    pub p_flow_bar: f64,
    pub p_return_bar: f64,
    pub t_flow_c: f64,
    pub t_return_c: f64,
    pub converged: bool,
}

pub fn pump_summary(hours: &[HourRecord]) -> Vec<PumpSummaryRow> {
    hours
        .iter()
        .map(|h| PumpSummaryRow {
            hour: h.hour,
            heat_kw: h.pump.heat_w / 1000.0,
            mdot_kg_s: h.pump.mdot_kg_s,
            lift_bar: h.pump.lift_bar,
            p_flow_bar: h.pump.p_flow_bar,
            p_return_bar: h.pump.p_return_bar,
            t_flow_c: kelvin_to_celsius(h.pump.t_flow_k),
            t_return_c: kelvin_to_celsius(h.pump.t_return_k),
            converged: h.converged,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PumpTotals {
    pub hours: usize,
    /// Hourly records, so the sum of kW is kWh.
    pub heat_kwh: f64,
    pub peak_heat_kw: f64,
    pub max_lift_bar: f64,
    pub mean_return_c: f64,
}

pub fn pump_totals(rows: &[PumpSummaryRow]) -> PumpTotals {
    if rows.is_empty() {
        return PumpTotals::default();
    }
    let n = rows.len() as f64;
    PumpTotals {
        hours: rows.len(),
        heat_kwh: rows.iter().map(|r| r.heat_kw).sum(),
        peak_heat_kw: rows.iter().map(|r| r.heat_kw).fold(f64::MIN, f64::max),
        max_lift_bar: rows.iter().map(|r| r.lift_bar).fold(f64::MIN, f64::max),
        mean_return_c: rows.iter().map(|r| r.t_return_c).sum::<f64>() / n,
    }
}

pub fn write_pump_csv(rows: &[PumpSummaryRow], writer: impl Write) -> ResultsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One consumer in one hour, long format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerRow<'a> {
    pub hour: usize,
    pub consumer: &'a str,
    pub qext_w: f64,
    pub mdot_kg_s: f64,
    pub t_from_c: f64,
    pub t_to_c: f64,
    pub dp_bar: f64,
    pub target_return_c: f64,
    pub supply_met: bool,
    pub status: &'static str,
}

pub fn consumer_rows<'a>(hours: &[HourRecord], consumer_ids: &'a [String]) -> Vec<ConsumerRow<'a>> {
    hours
        .iter()
        .flat_map(|h| {
            h.consumers
                .iter()
                .zip(consumer_ids)
                .map(move |(c, id)| ConsumerRow {
                    hour: h.hour,
                    consumer: id,
                    qext_w: c.qext_w,
                    mdot_kg_s: c.mdot_kg_s,
                    t_from_c: kelvin_to_celsius(c.t_from_k),
                    t_to_c: kelvin_to_celsius(c.t_to_k),
                    dp_bar: c.p_from_bar - c.p_to_bar,
                    target_return_c: c.target_return_c,
                    supply_met: c.supply_met,
                    status: c.status.label(),
                })
        })
        .collect()
}

pub fn write_consumer_csv(rows: &[ConsumerRow<'_>], writer: impl Write) -> ResultsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
