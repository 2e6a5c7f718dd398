use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{BOUNDARY, EXPONENTIAL, TRIGONOMETRIC, UNDEFINED, UNRESOLVED};

/// Typed reading of a depth code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Locally a polynomial of this degree (0 = constant).
    Polynomial(u32),
    /// A detected change between two regimes.
    Boundary,
    /// No vanishing difference within the depth budget.
    Unresolved,
    Exponential,
    Trigonometric,
    Undefined,
}

impl Regime {
    /// Unknown negative codes read as [`Regime::Undefined`].
    pub fn from_depth(code: i32) -> Self {
        match code {
            UNRESOLVED => Self::Unresolved,
            BOUNDARY => Self::Boundary,
            EXPONENTIAL => Self::Exponential,
            TRIGONOMETRIC => Self::Trigonometric,
            d if d >= 0 => Self::Polynomial(d as u32),
            _ => Self::Undefined,
        }
    }

    pub fn to_depth(&self) -> i32 {
        match self {
            Self::Polynomial(d) => i32::try_from(*d).unwrap_or(UNRESOLVED),
            Self::Boundary => BOUNDARY,
            Self::Unresolved => UNRESOLVED,
            Self::Exponential => EXPONENTIAL,
            Self::Trigonometric => TRIGONOMETRIC,
            Self::Undefined => UNDEFINED,
        }
    }

    pub fn degree(&self) -> Option<u32> {
        match self {
            Self::Polynomial(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polynomial(0) => write!(f, "Constant"),
            Self::Polynomial(1) => write!(f, "Linear"),
            Self::Polynomial(2) => write!(f, "Square"),
            Self::Polynomial(3) => write!(f, "Cubic"),
            Self::Polynomial(n) => write!(f, "Polynomial({n})"),
            Self::Boundary => write!(f, "Point of Interest"),
            Self::Unresolved => write!(f, "Unresolved"),
            Self::Exponential => write!(f, "Exponential"),
            Self::Trigonometric => write!(f, "Trigonometric"),
            Self::Undefined => write!(f, "Undefined"),
        }
    }
}

/// A maximal run of indices sharing one regime. `end` is inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub regime: Regime,
}

impl Segment {
    /// Number of indices covered, `end` inclusive.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// A segment always covers at least one index.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Run-length segmentation of a depth array.
pub fn segments(depths: &[i32]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for (index, &code) in depths.iter().enumerate() {
        let regime = Regime::from_depth(code);
        match out.last_mut() {
            Some(seg) if seg.regime == regime => seg.end = index,
            _ => out.push(Segment {
                start: index,
                end: index,
                regime,
            }),
        }
    }
    out
}
