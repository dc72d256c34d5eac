//! Discrete PID arithmetic, one update per solver iteration.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// PID gains. The sample period is one iteration, so gains are per-iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.95,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> ControlResult<Self> {
        let gains = Self { kp, ki, kd };
        gains.validate()?;
        Ok(gains)
    }

    pub fn validate(&self) -> ControlResult<()> {
        for (name, value) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ControlError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }

    /// Advance the accumulators by one error sample.
    ///
    /// The derivative is zero on the first sample after a reset.
    pub fn update(&self, state: &PidState, error: f64) -> (PidState, f64) {
        let integral = state.integral + error;
        let derivative = state.last_error.map_or(0.0, |last| error - last);
        let output = self.kp * error + self.ki * integral + self.kd * derivative;

        (
            PidState {
                integral,
                last_error: Some(error),
            },
            output,
        )
    }
}

/// Accumulators, reset at the start of every hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    pub integral: f64,
    pub last_error: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let gains = PidGains::new(2.0, 0.0, 0.0).unwrap();
        let (_, out) = gains.update(&PidState::default(), 0.5);
        assert!((out - 1.0).abs() < 1e-12);
    }

    #[test]
    fn integral_accumulates() {
        let gains = PidGains::new(0.0, 0.5, 0.0).unwrap();
        let mut state = PidState::default();
        let mut out = 0.0;
        for _ in 0..4 {
            (state, out) = gains.update(&state, 1.0);
        }
        assert_eq!(state.integral, 4.0);
        assert!((out - 2.0).abs() < 1e-12);
    }

    #[test]
    fn derivative_starts_at_zero() {
        let gains = PidGains::new(0.0, 0.0, 1.0).unwrap();
        let (state, first) = gains.update(&PidState::default(), 3.0);
        assert_eq!(first, 0.0);
        let (_, second) = gains.update(&state, 1.0);
        assert!((second + 2.0).abs() < 1e-12);
    }

    #[test]
    fn negative_gain_rejected() {
        assert_eq!(
            PidGains::new(-1.0, 0.0, 0.0),
            Err(ControlError::InvalidSetting {
                name: "kp",
                value: -1.0
            })
        );
    }
}
