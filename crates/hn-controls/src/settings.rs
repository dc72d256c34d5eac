//! Typed controller settings and their validating builders.

use hn_components::VelocityEnvelope;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::pid::PidGains;

fn check(name: &'static str, value: f64, ok: bool) -> ControlResult<()> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(ControlError::InvalidSetting { name, value })
    }
}

/// Worst-point pressure controller settings (bar, W).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureControlSettings {
    pub target_dp_bar: f64,
    pub tolerance_bar: f64,
    pub gain: f64,
    /// At or below this worst-point demand the pump is left alone.
    pub bypass_w: f64,
}

impl Default for PressureControlSettings {
    fn default() -> Self {
        Self {
            target_dp_bar: 1.0,
            tolerance_bar: 0.2,
            gain: 0.2,
            bypass_w: 400.0,
        }
    }
}

impl PressureControlSettings {
    pub fn builder() -> PressureControlSettingsBuilder {
        PressureControlSettingsBuilder::default()
    }

    pub fn validate(&self) -> ControlResult<()> {
        check("target_dp_bar", self.target_dp_bar, self.target_dp_bar > 0.0)?;
        check("tolerance_bar", self.tolerance_bar, self.tolerance_bar > 0.0)?;
        check("gain", self.gain, self.gain > 0.0)?;
        check("bypass_w", self.bypass_w, self.bypass_w >= 0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PressureControlSettingsBuilder {
    settings: PressureControlSettings,
}

impl PressureControlSettingsBuilder {
    pub fn with_target_dp_bar(mut self, bar: f64) -> Self {
        self.settings.target_dp_bar = bar;
        self
    }

    pub fn with_tolerance_bar(mut self, bar: f64) -> Self {
        self.settings.tolerance_bar = bar;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.settings.gain = gain;
        self
    }

    pub fn with_bypass_w(mut self, watts: f64) -> Self {
        self.settings.bypass_w = watts;
        self
    }

    pub fn build(self) -> ControlResult<PressureControlSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

/// Return-temperature controller settings (°C, K, W).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnTemperatureSettings {
    /// Target return temperature when no schedule overrides it.
    pub target_return_c: f64,
    pub gains: PidGains,
    pub tolerance_k: f64,
    pub envelope: VelocityEnvelope,
    pub max_iterations: usize,
    /// At or below this demand the consumer runs at minimum flow.
    pub bypass_w: f64,
    /// Smallest admissible inlet − target approach; `None` disables the clamp.
    pub min_approach_k: Option<f64>,
    /// Target shift when the inlet sits exactly on the target.
    pub equal_inlet_nudge_k: f64,
    /// Consecutive observations pinned at a flow limit tolerated before the
    /// controller settles as limit-reached; leaving the limit restarts the
    /// count, so settling takes `limit_hold_iterations + 1` observations.
    pub limit_hold_iterations: usize,
    /// Lower the target by this much while held at maximum flow.
    pub relax_step_k: Option<f64>,
    /// Raise flow while the inlet is below the minimum supply temperature,
    /// and withhold convergence until it is met.
    pub min_supply_control: bool,
}

impl Default for ReturnTemperatureSettings {
    fn default() -> Self {
        Self {
            target_return_c: 60.0,
            gains: PidGains::default(),
            tolerance_k: 2.0,
            envelope: VelocityEnvelope::default(),
            max_iterations: 100,
            bypass_w: 500.0,
            min_approach_k: Some(15.0),
            equal_inlet_nudge_k: 0.1,
            limit_hold_iterations: 10,
            relax_step_k: None,
            min_supply_control: false,
        }
    }
}

impl ReturnTemperatureSettings {
    pub fn builder() -> ReturnTemperatureSettingsBuilder {
        ReturnTemperatureSettingsBuilder::default()
    }

    pub fn validate(&self) -> ControlResult<()> {
        check("target_return_c", self.target_return_c, true)?;
        self.gains.validate()?;
        check("tolerance_k", self.tolerance_k, self.tolerance_k > 0.0)?;
        self.envelope
            .validate()
            .map_err(|_| ControlError::InvalidArg {
                what: "velocity envelope",
            })?;
        if self.max_iterations == 0 {
            return Err(ControlError::InvalidArg {
                what: "max_iterations must be positive",
            });
        }
        check("bypass_w", self.bypass_w, self.bypass_w >= 0.0)?;
        if let Some(approach) = self.min_approach_k {
            check("min_approach_k", approach, approach >= 0.0)?;
        }
        check(
            "equal_inlet_nudge_k",
            self.equal_inlet_nudge_k,
            self.equal_inlet_nudge_k != 0.0,
        )?;
        if let Some(step) = self.relax_step_k {
            check("relax_step_k", step, step > 0.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReturnTemperatureSettingsBuilder {
    settings: ReturnTemperatureSettings,
}

impl ReturnTemperatureSettingsBuilder {
    pub fn with_target_return_c(mut self, celsius: f64) -> Self {
        self.settings.target_return_c = celsius;
        self
    }

    pub fn with_gains(mut self, gains: PidGains) -> Self {
        self.settings.gains = gains;
        self
    }

    pub fn with_tolerance_k(mut self, kelvin: f64) -> Self {
        self.settings.tolerance_k = kelvin;
        self
    }

    pub fn with_envelope(mut self, envelope: VelocityEnvelope) -> Self {
        self.settings.envelope = envelope;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.settings.max_iterations = n;
        self
    }

    pub fn with_bypass_w(mut self, watts: f64) -> Self {
        self.settings.bypass_w = watts;
        self
    }

    pub fn with_min_approach_k(mut self, kelvin: f64) -> Self {
        self.settings.min_approach_k = Some(kelvin);
        self
    }

    pub fn without_min_approach(mut self) -> Self {
        self.settings.min_approach_k = None;
        self
    }

    pub fn with_equal_inlet_nudge_k(mut self, kelvin: f64) -> Self {
        self.settings.equal_inlet_nudge_k = kelvin;
        self
    }

    pub fn with_limit_hold_iterations(mut self, n: usize) -> Self {
        self.settings.limit_hold_iterations = n;
        self
    }

    pub fn with_relax_step_k(mut self, kelvin: f64) -> Self {
        self.settings.relax_step_k = Some(kelvin);
        self
    }

    pub fn with_min_supply_control(mut self, enabled: bool) -> Self {
        self.settings.min_supply_control = enabled;
        self
    }

    pub fn build(self) -> ControlResult<ReturnTemperatureSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PressureControlSettings::default().validate().is_ok());
        assert!(ReturnTemperatureSettings::default().validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let s = ReturnTemperatureSettings::builder()
            .with_target_return_c(45.0)
            .with_tolerance_k(0.5)
            .with_relax_step_k(1.0)
            .build()
            .unwrap();
        assert_eq!(s.target_return_c, 45.0);
        assert_eq!(s.relax_step_k, Some(1.0));
        assert_eq!(s.bypass_w, 500.0);
        assert!(!s.min_supply_control);
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert_eq!(
            PressureControlSettings::builder().with_gain(0.0).build(),
            Err(ControlError::InvalidSetting {
                name: "gain",
                value: 0.0
            })
        );
        assert!(
            ReturnTemperatureSettings::builder()
                .with_max_iterations(0)
                .build()
                .is_err()
        );
        assert!(
            ReturnTemperatureSettings::builder()
                .with_envelope(VelocityEnvelope {
                    min_mps: 3.0,
                    max_mps: 1.0
                })
                .build()
                .is_err()
        );
    }
}
