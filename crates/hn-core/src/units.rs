// hn-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, MassRate as UomMassRate, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn celsius_to_kelvin(c: f64) -> f64 {
    c + constants::KELVIN_OFFSET
}

#[inline]
pub fn kelvin_to_celsius(k: f64) -> f64 {
    k - constants::KELVIN_OFFSET
}

pub mod constants {
    /// Offset between the Celsius and Kelvin scales.
    pub const KELVIN_OFFSET: f64 = 273.15;

    /// Specific heat capacity of water used by the controllers, J/(kg K).
    pub const CP_WATER_J_PER_KG_K: f64 = 4190.0;

    /// Density used to turn a volumetric velocity envelope into mass flow.
    pub const RHO_WATER_KG_M3: f64 = 1000.0;
}
