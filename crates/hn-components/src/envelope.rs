//! Velocity envelope → mass-flow bounds.

use std::f64::consts::PI;

use hn_core::units::constants::RHO_WATER_KG_M3;
use hn_core::units::{Area, Length, MassRate, Velocity, mps};
use serde::{Deserialize, Serialize};
use uom::si::f64::MassDensity;
use uom::si::mass_density::kilogram_per_cubic_meter;
use uom::si::mass_rate::kilogram_per_second;

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};

/// Admissible flow velocity range in a consumer's pipe (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityEnvelope {
    pub min_mps: f64,
    pub max_mps: f64,
}

impl Default for VelocityEnvelope {
    fn default() -> Self {
        Self {
            min_mps: 0.01,
            max_mps: 2.0,
        }
    }
}

impl VelocityEnvelope {
    pub fn new(min_mps: f64, max_mps: f64) -> ComponentResult<Self> {
        let envelope = Self { min_mps, max_mps };
        envelope.validate()?;
        Ok(envelope)
    }

    pub fn validate(&self) -> ComponentResult<()> {
        check_positive(self.min_mps, "minimum velocity")?;
        check_positive(self.max_mps, "maximum velocity")?;
        if self.min_mps > self.max_mps {
            return Err(ComponentError::InvalidArg {
                what: "minimum velocity exceeds maximum velocity",
            });
        }
        Ok(())
    }

    /// Mass-flow bounds for a pipe of the given inner diameter.
    pub fn bounds(&self, diameter: Length) -> MassFlowBounds {
        MassFlowBounds {
            min_kg_s: water_mass_flow(mps(self.min_mps), diameter).get::<kilogram_per_second>(),
            max_kg_s: water_mass_flow(mps(self.max_mps), diameter).get::<kilogram_per_second>(),
        }
    }
}

/// Mass flow of water at `velocity` through a circular cross-section.
pub fn water_mass_flow(velocity: Velocity, diameter: Length) -> MassRate {
    let area: Area = diameter * diameter * (PI / 4.0);
    let rho = MassDensity::new::<kilogram_per_cubic_meter>(RHO_WATER_KG_M3);
    rho * area * velocity
}

/// Physical mass-flow limits of one consumer (kg/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassFlowBounds {
    pub min_kg_s: f64,
    pub max_kg_s: f64,
}

impl MassFlowBounds {
    pub fn clamp(&self, mdot: f64) -> f64 {
        mdot.clamp(self.min_kg_s, self.max_kg_s)
    }

    pub fn contains(&self, mdot: f64) -> bool {
        (self.min_kg_s..=self.max_kg_s).contains(&mdot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::m;

    #[test]
    fn bounds_follow_velocity_times_area() {
        let d = 0.05;
        let bounds = VelocityEnvelope::default().bounds(m(d));
        let area = PI / 4.0 * d * d;
        assert!((bounds.min_kg_s - 0.01 * area * 1000.0).abs() < 1e-12);
        assert!((bounds.max_kg_s - 2.0 * area * 1000.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_stays_inside() {
        let bounds = MassFlowBounds {
            min_kg_s: 0.02,
            max_kg_s: 3.9,
        };
        assert_eq!(bounds.clamp(0.0), 0.02);
        assert_eq!(bounds.clamp(10.0), 3.9);
        assert_eq!(bounds.clamp(1.0), 1.0);
        assert!(bounds.contains(0.02));
    }

    #[test]
    fn inverted_envelope_rejected() {
        assert!(VelocityEnvelope::new(2.0, 0.01).is_err());
        assert!(VelocityEnvelope::new(0.0, 1.0).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use hn_core::units::mm;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamped_flow_within_bounds(d in 5.0f64..400.0, mdot in -10.0f64..50.0) {
            let bounds = VelocityEnvelope::default().bounds(mm(d));
            prop_assert!(bounds.min_kg_s <= bounds.max_kg_s);
            prop_assert!(bounds.contains(bounds.clamp(mdot)));
        }
    }
}
