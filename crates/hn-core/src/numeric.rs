use crate::HnError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, HnError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HnError::NonFinite { what, value: v })
    }
}

/// Wrap an angle in radians into `(-pi, pi]`.
pub fn wrap_angle(rad: f64) -> f64 {
    use core::f64::consts::{PI, TAU};
    let mut a = rad % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        use core::f64::consts::PI;
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-12);
    }
}
