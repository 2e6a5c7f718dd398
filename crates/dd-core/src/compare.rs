//! Approximate comparisons used wherever computed values are tested for
//! equality or zero.

use num_traits::Float;

use crate::error::{Result, SeriesError};

/// True iff `|a - b| <= tolerance`. Both ends of the interval are inclusive.
///
/// Fails on a negative or NaN tolerance.
pub fn approx_equal<T: Float>(a: T, b: T, tolerance: T) -> Result<bool> {
    check_tolerance(tolerance, "tolerance")?;
    Ok(within(a, b, tolerance))
}

/// True iff `b` lies within `a * (1 ± fraction)`, inclusive.
///
/// The interval is ordered before testing, so a negative `a` behaves the same
/// as its positive mirror. `fraction` must lie in `[0, 1]`.
pub fn proportional_equal<T: Float>(a: T, b: T, fraction: T) -> Result<bool> {
    if !(fraction >= T::zero() && fraction <= T::one()) {
        return Err(SeriesError::InvalidArgument(format!(
            "fraction must lie in [0, 1], got {}",
            as_f64(fraction)
        )));
    }
    let lo = a * (T::one() - fraction);
    let hi = a * (T::one() + fraction);
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    Ok(b >= lo && b <= hi)
}

/// Unchecked form of [`approx_equal`] for tolerances validated up front.
/// NaN on either side never matches.
pub(crate) fn within<T: Float>(a: T, b: T, tolerance: T) -> bool {
    b >= a - tolerance && b <= a + tolerance
}

pub(crate) fn check_tolerance<T: Float>(tolerance: T, name: &str) -> Result<()> {
    if tolerance >= T::zero() {
        Ok(())
    } else {
        Err(SeriesError::InvalidArgument(format!(
            "{name} must be non-negative, got {}",
            as_f64(tolerance)
        )))
    }
}

fn as_f64<T: Float>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_equal_closed_interval() {
        let v = 5.0;
        assert!(approx_equal(v, v, 0.0).unwrap());
        assert!(approx_equal(v, v, 0.1).unwrap());
        assert!(approx_equal(v, v + 0.1, 0.1).unwrap());
        assert!(approx_equal(v, v - 0.1, 0.1).unwrap());
        assert!(!approx_equal(v, v + 0.11, 0.1).unwrap());
        assert!(!approx_equal(v, v - 0.11, 0.1).unwrap());
    }

    #[test]
    fn test_approx_equal_floating_noise() {
        let v = 5.0;
        assert!(!approx_equal(v, v + 1e-15, 0.0).unwrap());
        assert!(!approx_equal(v, v - 1e-15, 0.0).unwrap());
        assert!(approx_equal(v, v + 1e-15, 0.1).unwrap());
        assert!(approx_equal(v, v - 1e-15, 0.1).unwrap());
    }

    #[test]
    fn test_approx_equal_rejects_negative_tolerance() {
        let err = approx_equal(1.0, 1.0, -0.1).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidArgument(_)));
        assert!(approx_equal(1.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_approx_equal_nan_never_matches() {
        assert!(!approx_equal(1.0, f64::NAN, 10.0).unwrap());
        assert!(!approx_equal(f64::NAN, 1.0, 10.0).unwrap());
    }

    #[test]
    fn test_approx_equal_f32() {
        assert!(approx_equal(1.0f32, 1.05f32, 0.1f32).unwrap());
    }

    #[test]
    fn test_proportional_equal() {
        assert!(proportional_equal(100.0, 109.0, 0.1).unwrap());
        assert!(proportional_equal(100.0, 91.0, 0.1).unwrap());
        assert!(!proportional_equal(100.0, 111.0, 0.1).unwrap());
        assert!(proportional_equal(100.0, 100.0, 0.0).unwrap());
        assert!(!proportional_equal(100.0, 100.5, 0.0).unwrap());
    }

    #[test]
    fn test_proportional_equal_negative_reference() {
        assert!(proportional_equal(-100.0, -105.0, 0.1).unwrap());
        assert!(!proportional_equal(-100.0, -120.0, 0.1).unwrap());
    }

    #[test]
    fn test_proportional_equal_rejects_fraction_out_of_range() {
        assert!(matches!(
            proportional_equal(1.0, 1.0, 1.5),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(proportional_equal(1.0, 1.0, -0.1).is_err());
        assert!(proportional_equal(1.0, 1.0, f64::NAN).is_err());
    }
}
