//! Finite-difference evaluators.
//!
//! Every level of the difference pyramid is built from one primitive: the
//! slope between two neighbouring values a fixed `step` apart. The evaluator
//! is a strategy so the float and decimal paths stay interchangeable.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::compare::{check_tolerance, within};
use crate::constants::{MAX_DECIMAL_DIGITS, MIN_DECIMAL_DIGITS};
use crate::error::{Result, SeriesError};

pub trait Tangent {
    /// Slope between `y1` and `y2`, with `y2` one `step` after `y1`.
    fn tangent(&self, step: f64, y1: f64, y2: f64) -> f64;
}

/// Which evaluator the engine builds from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TangentMode {
    #[default]
    Float,
    Decimal,
}

/// Plain `(y2 - y1) / step` in f64.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatTangent;

impl Tangent for FloatTangent {
    fn tangent(&self, step: f64, y1: f64, y2: f64) -> f64 {
        (y2 - y1) / step
    }
}

/// Decimal arithmetic rounded to a fixed number of significant digits.
///
/// Inputs are converted to their shortest decimal form first, so `0.1`
/// really is one tenth and repeated differencing does not accumulate binary
/// representation error. Values outside the decimal range (about ±7.9e28),
/// and non-finite values, fall back to [`FloatTangent`].
#[derive(Clone, Copy, Debug)]
pub struct DecimalTangent {
    digits: u32,
}

impl DecimalTangent {
    pub fn new(digits: u32) -> Result<Self> {
        if !(MIN_DECIMAL_DIGITS..=MAX_DECIMAL_DIGITS).contains(&digits) {
            return Err(SeriesError::InvalidArgument(format!(
                "decimal precision must be {MIN_DECIMAL_DIGITS}..={MAX_DECIMAL_DIGITS} \
                 significant digits, got {digits}"
            )));
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    fn exact(&self, step: f64, y1: f64, y2: f64) -> Option<f64> {
        let step = Decimal::from_f64(step)?;
        let y1 = Decimal::from_f64(y1)?;
        let y2 = Decimal::from_f64(y2)?;
        let slope = y2.checked_sub(y1)?.checked_div(step)?;
        slope.round_sf(self.digits)?.to_f64()
    }
}

impl Tangent for DecimalTangent {
    fn tangent(&self, step: f64, y1: f64, y2: f64) -> f64 {
        self.exact(step, y1, y2)
            .unwrap_or_else(|| FloatTangent.tangent(step, y1, y2))
    }
}

/// Forces the difference to exactly `0.0` when the inputs are within
/// `epsilon` of each other; otherwise defers to the wrapped evaluator.
#[derive(Clone, Copy, Debug)]
pub struct NoiseTolerant<E> {
    inner: E,
    epsilon: f64,
}

impl<E> NoiseTolerant<E> {
    pub fn new(inner: E, epsilon: f64) -> Result<Self> {
        check_tolerance(epsilon, "epsilon")?;
        Ok(Self { inner, epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Tangent> Tangent for NoiseTolerant<E> {
    fn tangent(&self, step: f64, y1: f64, y2: f64) -> f64 {
        if within(y1, y2, self.epsilon) {
            0.0
        } else {
            self.inner.tangent(step, y1, y2)
        }
    }
}
