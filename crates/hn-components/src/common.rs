//! Common helpers for component calculations.

use crate::error::{ComponentError, ComponentResult};
use hn_core::numeric::ensure_finite;

/// Mass flows below this are treated as no flow (kg/s).
pub const EPSILON_MDOT: f64 = 1e-9;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<()> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive(0.1, "test").is_ok());
        assert_eq!(
            check_positive(0.0, "test"),
            Err(ComponentError::InvalidArg { what: "test" })
        );
    }
}
