//! Hourly inputs of a simulation run.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// One consumer's hourly series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumerSchedule {
    /// Required heat power per hour (W).
    pub qext_w: Vec<f64>,
    /// Target return temperature per hour (°C); falls back to the settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_return_c: Option<Vec<f64>>,
    /// Minimum acceptable supply temperature per hour (°C).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_supply_c: Option<Vec<f64>>,
}

impl ConsumerSchedule {
    pub fn demand(qext_w: Vec<f64>) -> Self {
        Self {
            qext_w,
            ..Self::default()
        }
    }
}

/// Everything that varies by hour, indexed like the network's consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimInputs {
    pub consumers: Vec<ConsumerSchedule>,
    /// Network supply temperature per hour (°C); falls back to the pump.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_temperature_c: Option<Vec<f64>>,
}

impl SimInputs {
    pub fn hours(&self) -> usize {
        self.consumers.first().map_or(0, |c| c.qext_w.len())
    }

    pub fn qext_w(&self, hour: usize) -> Vec<f64> {
        self.consumers.iter().map(|c| c.qext_w[hour]).collect()
    }

    pub fn target_return_c(&self, consumer: usize, hour: usize) -> Option<f64> {
        self.consumers[consumer]
            .target_return_c
            .as_ref()
            .map(|s| s[hour])
    }

    pub fn min_supply_c(&self, consumer: usize, hour: usize) -> Option<f64> {
        self.consumers[consumer]
            .min_supply_c
            .as_ref()
            .map(|s| s[hour])
    }

    pub fn supply_temperature_c(&self, hour: usize) -> Option<f64> {
        self.supply_temperature_c.as_ref().map(|s| s[hour])
    }

    /// Check every series has one finite value per hour for `consumers` consumers.
    pub fn validate(&self, consumers: usize) -> SimResult<()> {
        if self.consumers.len() != consumers {
            return Err(SimError::Schedule {
                what: format!(
                    "{} consumer schedules for {} consumers",
                    self.consumers.len(),
                    consumers
                ),
            });
        }
        let hours = self.hours();
        let check = |name: &str, series: &[f64]| -> SimResult<()> {
            if series.len() != hours {
                return Err(SimError::Schedule {
                    what: format!("{name} has {} hours, expected {hours}", series.len()),
                });
            }
            if let Some(h) = series.iter().position(|v| !v.is_finite()) {
                return Err(SimError::Schedule {
                    what: format!("{name} is not finite at hour {h}"),
                });
            }
            Ok(())
        };

        for (i, c) in self.consumers.iter().enumerate() {
            check(&format!("consumer {i} demand"), &c.qext_w)?;
            if c.qext_w.iter().any(|&q| q < 0.0) {
                return Err(SimError::Schedule {
                    what: format!("consumer {i} demand is negative"),
                });
            }
            if let Some(s) = &c.target_return_c {
                check(&format!("consumer {i} return target"), s)?;
            }
            if let Some(s) = &c.min_supply_c {
                check(&format!("consumer {i} minimum supply"), s)?;
            }
        }
        if let Some(s) = &self.supply_temperature_c {
            check("supply temperature", s)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_lengths() {
        let inputs = SimInputs {
            consumers: vec![
                ConsumerSchedule::demand(vec![1.0, 2.0]),
                ConsumerSchedule::demand(vec![1.0]),
            ],
            supply_temperature_c: None,
        };
        assert!(matches!(inputs.validate(2), Err(SimError::Schedule { .. })));
        assert!(inputs.validate(3).is_err());
    }

    #[test]
    fn optional_series_fall_back() {
        let inputs = SimInputs {
            consumers: vec![ConsumerSchedule {
                qext_w: vec![1.0, 2.0],
                target_return_c: Some(vec![55.0, 50.0]),
                min_supply_c: None,
            }],
            supply_temperature_c: None,
        };
        assert!(inputs.validate(1).is_ok());
        assert_eq!(inputs.hours(), 2);
        assert_eq!(inputs.target_return_c(0, 1), Some(50.0));
        assert_eq!(inputs.min_supply_c(0, 1), None);
        assert_eq!(inputs.supply_temperature_c(0), None);
        assert_eq!(inputs.qext_w(1), vec![2.0]);
    }

    #[test]
    fn rejects_nan_demand() {
        let inputs = SimInputs {
            consumers: vec![ConsumerSchedule::demand(vec![1.0, f64::NAN])],
            supply_temperature_c: None,
        };
        assert!(inputs.validate(1).is_err());
    }
}
