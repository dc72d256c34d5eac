//! Outcome of one convergence check.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitSide {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStatus {
    NotConverged,
    /// Within tolerance.
    Converged,
    /// Demand too low to control.
    Bypassed,
    /// Pinned at a mass-flow limit long enough to give up.
    LimitReached(LimitSide),
    /// Best effort after `max_iterations`.
    IterationCap,
}

impl ConvergenceStatus {
    /// True when the controller needs no further iterations this hour.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::NotConverged)
    }

    /// Short lowercase name used in tabular exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotConverged => "not_converged",
            Self::Converged => "converged",
            Self::Bypassed => "bypassed",
            Self::LimitReached(LimitSide::Min) => "limit_min",
            Self::LimitReached(LimitSide::Max) => "limit_max",
            Self::IterationCap => "iteration_cap",
        }
    }

    /// Settled, but not by meeting the tolerance.
    pub fn is_flagged(self) -> bool {
        matches!(self, Self::LimitReached(_) | Self::IterationCap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_and_flagged() {
        assert!(!ConvergenceStatus::NotConverged.is_settled());
        assert!(ConvergenceStatus::Bypassed.is_settled());
        assert!(!ConvergenceStatus::Bypassed.is_flagged());
        assert!(ConvergenceStatus::LimitReached(LimitSide::Max).is_flagged());
        assert!(ConvergenceStatus::IterationCap.is_flagged());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ConvergenceStatus::LimitReached(LimitSide::Min)).unwrap();
        assert_eq!(json, r#"{"limit_reached":"min"}"#);
        let json = serde_json::to_string(&ConvergenceStatus::IterationCap).unwrap();
        assert_eq!(json, r#""iteration_cap""#);
    }
}
