//! Circulation pump with constant pressure control at the heat plant.

use hn_core::units::constants::KELVIN_OFFSET;
use hn_core::units::{Pressure, Temperature, bar, k};
use serde::{Deserialize, Serialize};
use uom::si::pressure::bar as bar_unit;
use uom::si::thermodynamic_temperature::kelvin;

use crate::common::{check_finite, check_positive};
use crate::error::{ComponentError, ComponentResult};

/// Pump holding the flow-side pressure and a lift (flow − return) pressure.
///
/// ## Sign Conventions
///
/// - `lift` is the pressure rise return → flow, positive
/// - `flow` is the absolute pressure on the flow (supply) side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirculationPump {
    pub name: String,
    pub lift_bar: f64,
    pub flow_bar: f64,
    /// Supply temperature leaving the plant (°C).
    pub supply_temperature_c: f64,
}

impl CirculationPump {
    pub fn new(
        name: impl Into<String>,
        lift: Pressure,
        flow: Pressure,
        supply_temperature: Temperature,
    ) -> ComponentResult<Self> {
        let lift_bar = lift.get::<bar_unit>();
        let flow_bar = flow.get::<bar_unit>();
        check_positive(lift_bar, "pump lift pressure")?;
        check_positive(flow_bar, "pump flow pressure")?;
        if lift_bar > flow_bar {
            return Err(ComponentError::InvalidArg {
                what: "pump lift exceeds flow pressure",
            });
        }
        let t = supply_temperature.get::<kelvin>();
        check_finite(t, "supply temperature")?;
        Ok(Self {
            name: name.into(),
            lift_bar,
            flow_bar,
            supply_temperature_c: t - KELVIN_OFFSET,
        })
    }

    /// Plant defaults: 1.5 bar lift, 4 bar flow pressure, 85 °C supply.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lift_bar: 1.5,
            flow_bar: 4.0,
            supply_temperature_c: 85.0,
        }
    }

    pub fn lift(&self) -> Pressure {
        bar(self.lift_bar)
    }

    pub fn flow(&self) -> Pressure {
        bar(self.flow_bar)
    }

    pub fn return_bar(&self) -> f64 {
        self.flow_bar - self.lift_bar
    }

    pub fn supply_temperature(&self) -> Temperature {
        k(self.supply_temperature_c + KELVIN_OFFSET)
    }
}
