//! Darcy-Weisbach friction for water-filled pipes.

use std::f64::consts::PI;

use hn_core::units::constants::RHO_WATER_KG_M3;

use crate::catalog::PipeType;
use crate::common::{EPSILON_MDOT, check_finite};
use crate::error::ComponentResult;

/// Dynamic viscosity of water at district-heating temperatures (Pa·s).
pub const WATER_VISCOSITY_PA_S: f64 = 3.5e-4;

/// Darcy friction factor: laminar below Re 2300, Swamee-Jain above.
pub fn friction_factor(reynolds: f64, relative_roughness: f64) -> f64 {
    if reynolds < 2300.0 {
        64.0 / reynolds
    } else {
        let a = relative_roughness / 3.7;
        let b = 5.74 / reynolds.powf(0.9);
        let f = 0.25 / (a + b).log10().powi(2);
        f.max(0.0001)
    }
}

/// Frictional pressure drop (Pa) for `mdot` kg/s through `length_m` of pipe.
///
/// Always non-negative; direction is up to the caller.
pub fn pressure_drop_pa(pipe: &PipeType, length_m: f64, mdot: f64) -> ComponentResult<f64> {
    let mdot_abs = mdot.abs();
    if mdot_abs < EPSILON_MDOT {
        return Ok(0.0);
    }

    let d = pipe.inner_diameter_mm / 1000.0;
    let area = PI * d * d / 4.0;
    let velocity = mdot_abs / (RHO_WATER_KG_M3 * area);
    let reynolds = RHO_WATER_KG_M3 * velocity * d / WATER_VISCOSITY_PA_S;
    check_finite(reynolds, "Reynolds number")?;

    let f = friction_factor(reynolds, pipe.roughness_mm / pipe.inner_diameter_mm);

    // ΔP = f·L/D · ½·ρ·v²
    let dp = f * length_m / d * 0.5 * RHO_WATER_KG_M3 * velocity.powi(2);
    check_finite(dp, "pressure drop")?;
    Ok(dp)
}
